use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use tracing::error;

use crate::config::Settings;

pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const ACCEPT_LANGUAGE_KO: &str = "ko-KR,ko;q=0.9,en-US;q=0.7,en;q=0.6";

pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_KO));
    headers
}

/// Client for the audition board: looks like a desktop Chrome in Korean locale.
pub fn create_client(settings: &Settings) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(&settings.user_agent)
        .default_headers(browser_headers())
        .cookie_store(true)
        .timeout(settings.http_timeout())
        .build()?;

    Ok(client)
}

/// Plain client for the Kakao APIs.
pub fn create_api_client(timeout: Duration) -> Result<Client> {
    let client = ClientBuilder::new().timeout(timeout).build()?;
    Ok(client)
}

/// Returns `(status, body)` for a failed response, logging it on the way.
pub async fn describe_failure(response: Response, what: &str) -> (u16, String) {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    error!("{} failed with status {}: {}", what, status, body);
    (status.as_u16(), body)
}
