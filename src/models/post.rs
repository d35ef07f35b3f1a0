use serde::{Deserialize, Serialize};
use std::fmt;

/// A single audition listing scraped from the board. Listings are unique by `(vid, title)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Post {
    pub vid: u64,
    pub title: String,
    pub url: String,
}

impl Post {
    pub fn new(vid: u64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            vid,
            title: title.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.vid, self.title)
    }
}
