use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

use crate::fetch::FetchedPage;
use crate::models::Post;
use crate::parsers::{clean_text, html_snippet};

// Tolerates both a decoded `&` and a raw `&amp;` in front of the parameter.
static VID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[?&]|&amp;)vid=(\d+)").expect("Invalid vid regex")
});

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Invalid anchor selector")
});

const SNIPPET_CHARS: usize = 400;

/// Decides whether a link points at a listing, and which one.
pub trait LinkMatcher: Send + Sync {
    fn identifier(&self, href: &str) -> Option<u64>;
}

/// Matches the board's `vid` query parameter.
#[derive(Debug, Default, Clone, Copy)]
pub struct VidMatcher;

impl LinkMatcher for VidMatcher {
    fn identifier(&self, href: &str) -> Option<u64> {
        VID_REGEX
            .captures(href)?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    }
}

pub struct PostExtractor<M = VidMatcher> {
    origin: Url,
    matcher: M,
}

impl PostExtractor<VidMatcher> {
    pub fn new(origin: &str) -> Result<Self> {
        Self::with_matcher(origin, VidMatcher)
    }
}

impl<M: LinkMatcher> PostExtractor<M> {
    pub fn with_matcher(origin: &str, matcher: M) -> Result<Self> {
        let origin = Url::parse(origin)
            .with_context(|| format!("Invalid site origin: {}", origin))?;
        Ok(Self { origin, matcher })
    }

    /// Unique posts in the page, highest `vid` first.
    pub fn extract(&self, html: &str) -> Vec<Post> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut posts = Vec::new();

        for anchor in document.select(&ANCHOR_SELECTOR) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(vid) = self.matcher.identifier(href) else {
                continue;
            };

            let title = clean_text(&anchor.text().collect::<String>());
            if title.is_empty() {
                continue;
            }

            if !seen.insert((vid, title.clone())) {
                continue;
            }

            posts.push(Post {
                vid,
                title,
                url: self.absolute_url(href),
            });
        }

        posts.sort_by(|a, b| b.vid.cmp(&a.vid));
        debug!("Extracted {} posts", posts.len());
        posts
    }

    /// Like [`extract`](Self::extract), but logs page context when nothing matched.
    pub fn extract_page(&self, page: &FetchedPage) -> Vec<Post> {
        let posts = self.extract(&page.html);

        if posts.is_empty() {
            warn!(
                "No posts parsed. status={} url={} snippet={}",
                page.status_display(),
                page.final_url,
                html_snippet(&page.html, SNIPPET_CHARS)
            );
        }

        posts
    }

    fn absolute_url(&self, href: &str) -> String {
        if !href.starts_with('/') {
            return href.to_string();
        }
        // A protocol-relative `//host/...` href must not move the link off the site.
        match self.origin.join(href) {
            Ok(url) if url.host_str() == self.origin.host_str() => url.to_string(),
            _ => format!("{}{}", self.origin.as_str().trim_end_matches('/'), href),
        }
    }
}
