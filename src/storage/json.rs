use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{State, StateStore};

/// Reads the state file, or a zero watermark when it does not exist yet.
pub fn load_state(path: &Path) -> Result<State> {
    if !path.exists() {
        info!("No state file at {}, starting from last_vid=0", path.display());
        return Ok(State::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Malformed state file {}", path.display()))
}

/// Pretty JSON, newline-terminated, plain overwrite.
pub fn save_state(path: &Path, state: &State) -> Result<()> {
    let mut content = serde_json::to_string_pretty(state).context("Failed to encode state")?;
    content.push('\n');

    fs::write(path, content)
        .with_context(|| format!("Failed to write state file {}", path.display()))?;

    info!("Saved last_vid={} to {}", state.last_vid, path.display());
    Ok(())
}

pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<State> {
        load_state(&self.path)
    }

    fn save(&self, state: &State) -> Result<()> {
        save_state(&self.path, state)
    }
}
