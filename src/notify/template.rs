use serde::Serialize;

use crate::models::BUTTON_TITLE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_web_url: Option<String>,
}

/// Kakao "text" message template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextTemplate {
    pub object_type: &'static str,
    pub text: String,
    pub link: Link,
    pub button_title: &'static str,
}

impl TextTemplate {
    /// Falls back to `default_url` when neither link is given.
    pub fn new(
        text: &str,
        web_url: Option<&str>,
        mobile_web_url: Option<&str>,
        default_url: &str,
    ) -> Self {
        let web_url = web_url.filter(|u| !u.is_empty()).map(str::to_string);
        let mobile_web_url = mobile_web_url.filter(|u| !u.is_empty()).map(str::to_string);

        let link = if web_url.is_none() && mobile_web_url.is_none() {
            Link {
                web_url: Some(default_url.to_string()),
                mobile_web_url: None,
            }
        } else {
            Link {
                web_url,
                mobile_web_url,
            }
        };

        Self {
            object_type: "text",
            text: text.to_string(),
            link,
            button_title: BUTTON_TITLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const AUDITION_URL: &str = "https://otr.co.kr/audition/";

    #[test]
    fn defaults_link_to_audition_board() {
        let template = TextTemplate::new("안녕", None, None, AUDITION_URL);

        assert_eq!(
            serde_json::to_value(&template).unwrap(),
            json!({
                "object_type": "text",
                "text": "안녕",
                "link": { "web_url": AUDITION_URL },
                "button_title": "보기"
            })
        );
    }

    #[test]
    fn uses_supplied_links() {
        let url = "https://otr.co.kr/audition/view?vid=15";
        let template = TextTemplate::new("새 글", Some(url), Some(url), AUDITION_URL);

        assert_eq!(
            serde_json::to_value(&template).unwrap()["link"],
            json!({ "web_url": url, "mobile_web_url": url })
        );
    }

    #[test]
    fn mobile_only_link_is_kept_alone() {
        let template = TextTemplate::new("x", None, Some("https://m.example"), AUDITION_URL);
        assert_eq!(template.link.web_url, None);
        assert_eq!(template.link.mobile_web_url.as_deref(), Some("https://m.example"));
    }
}
