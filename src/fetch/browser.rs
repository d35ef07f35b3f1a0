use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::common::capabilities::chromium::ChromiumLikeCapabilities;
use thirtyfour::{CapabilitiesHelper, DesiredCapabilities, PageLoadStrategy, WebDriver};
use tracing::{info, warn};

use super::{FetchedPage, PageFetcher};
use crate::config::Settings;

const NAVIGATION_STATUS_SCRIPT: &str = "const nav = performance.getEntriesByType('navigation')[0]; \
     return nav && nav.responseStatus ? nav.responseStatus : null;";

/// Renders the page in headless Chrome through a WebDriver server.
pub struct BrowserFetcher {
    webdriver_url: String,
    url: String,
    user_agent: String,
    timeout: Duration,
    settle: Duration,
}

impl BrowserFetcher {
    pub fn new(settings: &Settings, webdriver_url: &str) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            url: settings.audition_url.clone(),
            user_agent: settings.user_agent.clone(),
            timeout: settings.browser_timeout(),
            settle: settings.browser_settle(),
        }
    }

    async fn connect(&self) -> Result<WebDriver> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless()
            .map_err(|e| anyhow!("Failed to set headless: {}", e))?;
        caps.add_arg(&format!("--user-agent={}", self.user_agent))
            .map_err(|e| anyhow!("Failed to set user agent: {}", e))?;
        caps.add_arg("--lang=ko-KR")
            .map_err(|e| anyhow!("Failed to set locale: {}", e))?;
        // Return from navigation at DOMContentLoaded; the settle delay covers the rest.
        caps.set_page_load_strategy(PageLoadStrategy::Eager)
            .map_err(|e| anyhow!("Failed to set page load strategy: {}", e))?;

        WebDriver::new(&self.webdriver_url, caps)
            .await
            .with_context(|| format!("Failed to connect to WebDriver at {}", self.webdriver_url))
    }

    async fn render(&self, driver: &WebDriver) -> Result<FetchedPage> {
        driver
            .set_page_load_timeout(self.timeout)
            .await
            .context("Failed to set page load timeout")?;

        driver
            .goto(&self.url)
            .await
            .with_context(|| format!("Failed to navigate to {}", self.url))?;

        tokio::time::sleep(self.settle).await;

        let html = driver.source().await.context("Failed to get page source")?;
        let final_url = driver
            .current_url()
            .await
            .context("Failed to get current URL")?
            .to_string();
        let status = navigation_status(driver).await;

        Ok(FetchedPage {
            html,
            status,
            final_url,
        })
    }

    /// Connects and renders; the session is parked in `session` so it can be closed even on timeout.
    async fn open_and_render(&self, session: &mut Option<WebDriver>) -> Result<FetchedPage> {
        let driver = session.insert(self.connect().await?);
        self.render(driver).await
    }
}

async fn navigation_status(driver: &WebDriver) -> Option<u16> {
    match driver.execute(NAVIGATION_STATUS_SCRIPT, Vec::new()).await {
        Ok(ret) => ret.json().as_u64().and_then(|code| u16::try_from(code).ok()),
        Err(e) => {
            warn!("Could not read navigation status: {}", e);
            None
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self) -> Result<FetchedPage> {
        info!("Rendering {} via WebDriver at {}", self.url, self.webdriver_url);

        let mut session = None;
        let rendered =
            tokio::time::timeout(self.timeout, self.open_and_render(&mut session)).await;

        if let Some(driver) = session.take() {
            if let Err(e) = driver.quit().await {
                warn!("Failed to close browser session: {}", e);
            }
        }

        rendered.map_err(|_| anyhow!("Browser fetch timed out after {:?}", self.timeout))?
    }

    fn name(&self) -> &'static str {
        "headless browser"
    }
}
