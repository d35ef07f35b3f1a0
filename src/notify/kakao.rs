use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::{Notifier, NotifyError, TextTemplate};
use crate::config::{Credentials, Settings};
use crate::utils::http::describe_failure;

const TOKEN_PATH: &str = "/oauth/token";
const AUTHORIZE_PATH: &str = "/oauth/authorize";
const SEND_TO_ME_PATH: &str = "/v2/api/talk/memo/default/send";
const MESSAGE_SCOPE: &str = "talk_message";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Thin client over the Kakao OAuth and "send to me" endpoints.
#[derive(Clone)]
pub struct KakaoApi {
    client: Client,
    auth_base: String,
    api_base: String,
    default_link: String,
}

impl KakaoApi {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self::with_endpoints(
            client,
            &settings.auth_base_url,
            &settings.api_base_url,
            &settings.audition_url,
        )
    }

    pub fn with_endpoints(client: Client, auth_base: &str, api_base: &str, default_link: &str) -> Self {
        Self {
            client,
            auth_base: auth_base.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            default_link: default_link.to_string(),
        }
    }

    /// Exchanges the long-lived refresh token for an access token.
    pub async fn access_token(&self, rest_api_key: &str, refresh_token: &str) -> Result<String> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", rest_api_key),
            ("refresh_token", refresh_token),
        ];

        let token = self.request_token(&form).await?;
        match token.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(access_token),
            _ => {
                let body = serde_json::to_string(&token).unwrap_or_default();
                Err(NotifyError::NoAccessToken(body).into())
            }
        }
    }

    pub async fn send_to_me(
        &self,
        access_token: &str,
        text: &str,
        web_url: Option<&str>,
        mobile_web_url: Option<&str>,
    ) -> Result<()> {
        let template = TextTemplate::new(text, web_url, mobile_web_url, &self.default_link);
        let template_json =
            serde_json::to_string(&template).context("Failed to encode message template")?;

        let response = self
            .client
            .post(format!("{}{}", self.api_base, SEND_TO_ME_PATH))
            .bearer_auth(access_token)
            .form(&[("template_object", template_json.as_str())])
            .send()
            .await
            .context("Failed to send Kakao message")?;

        if !response.status().is_success() {
            let (status, body) = describe_failure(response, "Kakao send-to-me").await;
            return Err(NotifyError::Status {
                endpoint: "Kakao send-to-me",
                status,
                body,
            }
            .into());
        }

        info!("Successfully sent Kakao message ({} chars)", text.chars().count());
        Ok(())
    }

    /// URL the operator opens once to grant `talk_message` consent.
    pub fn authorize_url(&self, rest_api_key: &str, redirect_uri: &str) -> Result<String> {
        let query = serde_urlencoded::to_string([
            ("client_id", rest_api_key),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", MESSAGE_SCOPE),
        ])
        .context("Failed to encode authorize query")?;

        Ok(format!("{}{}?{}", self.auth_base, AUTHORIZE_PATH, query))
    }

    /// One-time exchange of an authorization code for a token pair.
    pub async fn exchange_code(
        &self,
        rest_api_key: &str,
        client_secret: Option<&str>,
        redirect_uri: &str,
        code: &str,
    ) -> Result<TokenResponse> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", rest_api_key),
        ];
        if let Some(secret) = client_secret.filter(|s| !s.is_empty()) {
            form.push(("client_secret", secret));
        }
        form.push(("redirect_uri", redirect_uri));
        form.push(("code", code));

        self.request_token(&form).await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .client
            .post(format!("{}{}", self.auth_base, TOKEN_PATH))
            .form(form)
            .send()
            .await
            .context("Failed to reach Kakao token endpoint")?;

        if !response.status().is_success() {
            let (status, body) = describe_failure(response, "Kakao token request").await;
            return Err(NotifyError::Status {
                endpoint: "Kakao token request",
                status,
                body,
            }
            .into());
        }

        response
            .json::<TokenResponse>()
            .await
            .context("Failed to decode Kakao token response")
    }
}

/// Where [`KakaoNotifier`] gets its credentials at send time.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Environment,
    Fixed(Credentials),
}

impl CredentialSource {
    pub fn resolve(&self) -> Result<Credentials, NotifyError> {
        match self {
            CredentialSource::Environment => Credentials::from_env(),
            CredentialSource::Fixed(credentials) => Ok(credentials.clone()),
        }
    }
}

pub struct KakaoNotifier {
    api: KakaoApi,
    credentials: CredentialSource,
}

impl KakaoNotifier {
    pub fn new(api: KakaoApi, credentials: CredentialSource) -> Self {
        Self { api, credentials }
    }

    pub fn from_env(api: KakaoApi) -> Self {
        Self::new(api, CredentialSource::Environment)
    }
}

#[async_trait]
impl Notifier for KakaoNotifier {
    async fn notify(&self, text: &str, url: Option<&str>) -> Result<()> {
        let credentials = self.credentials.resolve()?;
        let access_token = self
            .api
            .access_token(&credentials.rest_api_key, &credentials.refresh_token)
            .await?;
        self.api.send_to_me(&access_token, text, url, url).await
    }
}
