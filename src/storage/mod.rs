use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod json;
pub use json::{load_state, save_state, JsonStateStore};

/// Progress marker carried between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub last_vid: u64,
    /// Fields written by other tools; kept as-is on rewrite.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl State {
    pub fn new(last_vid: u64) -> Self {
        Self {
            last_vid,
            extra: Map::new(),
        }
    }
}

pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<State>;
    fn save(&self, state: &State) -> Result<()>;
}
