use otr_audition_watch::config::Settings;
use otr_audition_watch::fetch::{BrowserFetcher, PageFetcher};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

/// Accepts connections and never answers, like a wedged WebDriver server.
async fn silent_webdriver() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn session_startup_is_bounded_by_browser_timeout() {
    let webdriver_url = silent_webdriver().await;
    let settings = Settings {
        browser_timeout_seconds: 1,
        ..Settings::default()
    };
    let fetcher = BrowserFetcher::new(&settings, &webdriver_url);

    let started = Instant::now();
    let outcome = tokio::time::timeout(Duration::from_secs(8), fetcher.fetch()).await;

    let result = outcome.expect("browser fetch ignored its own timeout");
    let err = tokio_test::assert_err!(result);
    assert!(err.to_string().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(5));
}
