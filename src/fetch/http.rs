use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use super::{FetchedPage, PageFetcher};

pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self) -> Result<FetchedPage> {
        info!("Fetching {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Request failed for {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error {}: {}", status, self.url);
            bail!("HTTP error {} fetching {}", status, self.url);
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", final_url))?;

        Ok(FetchedPage {
            html,
            status: Some(status.as_u16()),
            final_url,
        })
    }

    fn name(&self) -> &'static str {
        "HTTP"
    }
}
