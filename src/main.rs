use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use otr_audition_watch::config::{test_message_requested, Settings};
use otr_audition_watch::fetch::{BrowserFetcher, HttpFetcher};
use otr_audition_watch::monitor::Monitor;
use otr_audition_watch::notify::{KakaoApi, KakaoNotifier};
use otr_audition_watch::storage::JsonStateStore;
use otr_audition_watch::utils;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("otr_audition_watch=info".parse()?),
        )
        .init();

    info!("Starting OTR audition watch");

    let settings = Settings::load()?;

    let client = utils::http::create_client(&settings)?;
    let api_client = utils::http::create_api_client(settings.http_timeout())?;

    let store = Arc::new(JsonStateStore::new(&settings.state_path));
    let primary = Arc::new(HttpFetcher::new(client, settings.audition_url.clone()));
    let notifier = Arc::new(KakaoNotifier::from_env(KakaoApi::new(api_client, &settings)));

    let mut monitor = Monitor::new(settings.clone(), store, primary, notifier)?
        .with_test_message(test_message_requested());

    match settings.webdriver() {
        Some(webdriver_url) => {
            monitor = monitor.with_fallback(Arc::new(BrowserFetcher::new(&settings, webdriver_url)));
        }
        None => info!("No WebDriver configured, browser fallback disabled"),
    }

    let report = monitor.run().await?;

    info!(
        "Check completed: watermark {} -> {}, notified={}, state_written={}",
        report.last_vid, report.watermark, report.notified, report.state_written
    );

    Ok(())
}
