use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::delta::detect_new_posts;
use crate::fetch::{fetch_posts, PageFetcher};
use crate::models::{Post, MESSAGE_PREFIX, TEST_MESSAGE, TRUNCATION_MARKER};
use crate::notify::Notifier;
use crate::parsers::PostExtractor;
use crate::storage::StateStore;

/// What one invocation saw and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub last_vid: u64,
    pub fetched: usize,
    pub new_posts: Vec<Post>,
    pub matches: Vec<Post>,
    pub watermark: u64,
    pub notified: bool,
    pub state_written: bool,
}

pub struct Monitor {
    settings: Settings,
    extractor: PostExtractor,
    store: Arc<dyn StateStore>,
    primary: Arc<dyn PageFetcher>,
    fallback: Option<Arc<dyn PageFetcher>>,
    notifier: Arc<dyn Notifier>,
    send_test_message: bool,
}

impl Monitor {
    pub fn new(
        settings: Settings,
        store: Arc<dyn StateStore>,
        primary: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let extractor = PostExtractor::new(&settings.site_origin)?;
        Ok(Self {
            settings,
            extractor,
            store,
            primary,
            fallback: None,
            notifier,
            send_test_message: false,
        })
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn PageFetcher>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_test_message(mut self, enabled: bool) -> Self {
        self.send_test_message = enabled;
        self
    }

    /// One full check. State is only written after every other step succeeded.
    pub async fn run(&self) -> Result<RunReport> {
        info!(
            "--- Starting audition check at {} ---",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let mut state = self.store.load()?;
        let last_vid = state.last_vid;

        let posts = fetch_posts(&*self.primary, self.fallback.as_deref(), &self.extractor).await?;
        let delta = detect_new_posts(&posts, last_vid);

        info!(
            "last_vid={} fetched={} new_posts={}",
            last_vid,
            posts.len(),
            delta.new_posts.len()
        );

        if self.send_test_message {
            info!("Sending test message");
            self.notifier
                .notify(TEST_MESSAGE, Some(self.settings.audition_url.as_str()))
                .await?;
        }

        let matches = filter_by_keyword(&delta.new_posts, &self.settings.keyword);
        info!("keyword={} matches={}", self.settings.keyword, matches.len());
        for post in &matches {
            info!("New match: {}", post);
        }

        let notified = match matches.last() {
            Some(latest) => {
                let text = build_message(
                    &self.settings.keyword,
                    &matches,
                    self.settings.max_message_chars,
                );
                self.notifier.notify(&text, Some(latest.url.as_str())).await?;
                true
            }
            None => false,
        };

        let state_written = delta.watermark != last_vid;
        if state_written {
            state.last_vid = delta.watermark;
            self.store.save(&state)?;
        }

        Ok(RunReport {
            last_vid,
            fetched: posts.len(),
            new_posts: delta.new_posts,
            matches,
            watermark: delta.watermark,
            notified,
            state_written,
        })
    }
}

/// Case-sensitive substring match on the title.
pub fn filter_by_keyword(posts: &[Post], keyword: &str) -> Vec<Post> {
    posts
        .iter()
        .filter(|post| post.title.contains(keyword))
        .cloned()
        .collect()
}

pub fn build_message(keyword: &str, matches: &[Post], max_chars: usize) -> String {
    let mut lines = vec![format!(
        "{} {} 신규 {}건",
        MESSAGE_PREFIX,
        keyword,
        matches.len()
    )];
    for post in matches {
        lines.push(format!("- {}", post.title));
        lines.push(post.url.clone());
    }

    truncate_message(&lines.join("\n"), max_chars)
}

/// Cuts to `max_chars` characters and appends the truncation marker when needed.
pub fn truncate_message(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
