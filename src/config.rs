use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::models::DEFAULT_KEYWORD;
use crate::notify::NotifyError;

pub const CONFIG_FILE: &str = "otr_watch.toml";
pub const ENV_PREFIX: &str = "OTR_WATCH";

pub const ENV_REST_API_KEY: &str = "KAKAO_REST_API_KEY";
pub const ENV_REFRESH_TOKEN: &str = "KAKAO_REFRESH_TOKEN";
pub const ENV_TEST_MESSAGE: &str = "KAKAO_TEST_MESSAGE";

const DEFAULT_AUDITION_URL: &str = "https://otr.co.kr/audition/";
const DEFAULT_SITE_ORIGIN: &str = "https://otr.co.kr";
const DEFAULT_AUTH_BASE_URL: &str = "https://kauth.kakao.com";
const DEFAULT_API_BASE_URL: &str = "https://kapi.kakao.com";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub audition_url: String,
    pub site_origin: String,
    pub keyword: String,
    pub state_path: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    /// Empty disables the browser fallback.
    pub webdriver_url: String,
    pub user_agent: String,
    pub http_timeout_seconds: u64,
    pub browser_timeout_seconds: u64,
    pub browser_settle_millis: u64,
    pub max_message_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audition_url: DEFAULT_AUDITION_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            keyword: DEFAULT_KEYWORD.to_string(),
            state_path: "state.json".to_string(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout_seconds: 20,
            browser_timeout_seconds: 30,
            browser_settle_millis: 3000,
            max_message_chars: 900,
        }
    }
}

impl Settings {
    /// Defaults, then `otr_watch.toml` in the working directory, then `OTR_WATCH_*` variables.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Settings::default();

        let settings = config::Config::builder()
            .set_default("audition_url", defaults.audition_url)?
            .set_default("site_origin", defaults.site_origin)?
            .set_default("keyword", defaults.keyword)?
            .set_default("state_path", defaults.state_path)?
            .set_default("auth_base_url", defaults.auth_base_url)?
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("webdriver_url", defaults.webdriver_url)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("http_timeout_seconds", defaults.http_timeout_seconds as i64)?
            .set_default("browser_timeout_seconds", defaults.browser_timeout_seconds as i64)?
            .set_default("browser_settle_millis", defaults.browser_settle_millis as i64)?
            .set_default("max_message_chars", defaults.max_message_chars as i64)?
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn webdriver(&self) -> Option<&str> {
        let url = self.webdriver_url.trim();
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_seconds)
    }

    pub fn browser_settle(&self) -> Duration {
        Duration::from_millis(self.browser_settle_millis)
    }
}

/// Kakao credentials. Never written anywhere by this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub rest_api_key: String,
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(rest_api_key: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            rest_api_key: rest_api_key.into(),
            refresh_token: refresh_token.into(),
        }
    }

    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NotifyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(NotifyError::MissingEnv(key))
        };

        Ok(Self {
            rest_api_key: require(ENV_REST_API_KEY)?,
            refresh_token: require(ENV_REFRESH_TOKEN)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("rest_api_key", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

pub fn test_message_requested() -> bool {
    std::env::var(ENV_TEST_MESSAGE).map_or(false, |value| value == "1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(settings.audition_url, DEFAULT_AUDITION_URL);
        assert_eq!(settings.keyword, DEFAULT_KEYWORD);
        assert_eq!(settings.max_message_chars, 900);
        assert_eq!(settings.http_timeout(), Duration::from_secs(20));
        assert_eq!(settings.webdriver(), Some(DEFAULT_WEBDRIVER_URL));
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("otr_watch.toml");
        std::fs::write(
            &path,
            "keyword = \"연극\"\nwebdriver_url = \"\"\nbrowser_settle_millis = 500\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.keyword, "연극");
        assert_eq!(settings.webdriver(), None);
        assert_eq!(settings.browser_settle(), Duration::from_millis(500));
        assert_eq!(settings.site_origin, DEFAULT_SITE_ORIGIN);
    }

    #[test]
    fn credentials_report_missing_variable_by_name() {
        let vars: HashMap<&str, &str> = HashMap::from([(ENV_REST_API_KEY, "key")]);
        let err = Credentials::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(err.to_string().contains(ENV_REFRESH_TOKEN));

        let err = Credentials::from_lookup(|_| Some(String::new())).unwrap_err();
        assert!(err.to_string().contains(ENV_REST_API_KEY));
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = Credentials::new("secret-key", "secret-token");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("secret"));
    }
}
