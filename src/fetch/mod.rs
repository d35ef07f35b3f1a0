use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::Post;
use crate::parsers::{LinkMatcher, PostExtractor};

mod browser;
mod http;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;

// Script references served by the board's anti-automation page, lowercase.
const BOT_CHALLENGE_MARKERS: &[&str] = &["cupid.js", "tonumbers"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    /// `None` when the fetch path cannot observe the response status.
    pub status: Option<u16>,
    pub final_url: String,
}

impl FetchedPage {
    pub fn looks_like_bot_challenge(&self) -> bool {
        looks_like_bot_challenge(&self.html)
    }

    pub fn status_display(&self) -> String {
        self.status
            .map(|code| code.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub fn looks_like_bot_challenge(html: &str) -> bool {
    let lowered = html.to_lowercase();
    BOT_CHALLENGE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// One way of getting the listing page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self) -> Result<FetchedPage>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    BotChallenge,
    NoPosts,
}

/// Whether the primary result needs the rendered-browser fallback.
pub fn fallback_reason(page: &FetchedPage, parsed_posts: usize) -> Option<FallbackReason> {
    if page.looks_like_bot_challenge() {
        Some(FallbackReason::BotChallenge)
    } else if parsed_posts == 0 {
        Some(FallbackReason::NoPosts)
    } else {
        None
    }
}

/// Fetches with `primary`, retrying through `fallback` at most once.
pub async fn fetch_posts<M: LinkMatcher>(
    primary: &dyn PageFetcher,
    fallback: Option<&dyn PageFetcher>,
    extractor: &PostExtractor<M>,
) -> Result<Vec<Post>> {
    let page = primary.fetch().await?;

    let posts = if page.looks_like_bot_challenge() {
        Vec::new()
    } else {
        extractor.extract_page(&page)
    };

    let Some(reason) = fallback_reason(&page, posts.len()) else {
        return Ok(posts);
    };

    let Some(fallback) = fallback else {
        warn!(
            "{} fetch needs a fallback ({:?}) but none is configured",
            primary.name(),
            reason
        );
        return Ok(posts);
    };

    match reason {
        FallbackReason::BotChallenge => info!(
            "Bot challenge detected (cupid.js). Falling back to {}...",
            fallback.name()
        ),
        FallbackReason::NoPosts => info!(
            "No posts found via {}. Trying {} as a fallback...",
            primary.name(),
            fallback.name()
        ),
    }

    let page = fallback.fetch().await?;
    Ok(extractor.extract_page(&page))
}
