pub mod kakao;
pub mod template;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

pub use kakao::{CredentialSource, KakaoApi, KakaoNotifier, TokenResponse};
pub use template::{Link, TextTemplate};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Missing env {0}")]
    MissingEnv(&'static str),

    #[error("No access_token in response: {0}")]
    NoAccessToken(String),

    #[error("{endpoint} failed: {status} - {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },
}

/// Delivers a text message with an optional link.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str, url: Option<&str>) -> Result<()>;
}
