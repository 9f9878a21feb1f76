//! Configuration for bayes-rs
//!
//! [`ClassifierConfig`] carries the runtime options a classifier is built
//! with (the tokenizer). [`Settings`] holds the serializable tunables that
//! can be loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{BayesError, Result};
use crate::tokenizer::{DefaultTokenizer, Tokenizer};

/// Construction-time options for a classifier
#[derive(Clone)]
pub struct ClassifierConfig {
    pub(crate) tokenizer: Arc<dyn Tokenizer>,
}

impl ClassifierConfig {
    /// Use a custom tokenizer instead of [`DefaultTokenizer`]
    pub fn tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    /// Use a tokenizer that is already shared elsewhere
    pub fn shared_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            tokenizer: Arc::new(DefaultTokenizer),
        }
    }
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("tokenizer", &"<dyn Tokenizer>")
            .finish()
    }
}

/// Serializable classifier settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub snapshot: SnapshotSettings,
}

/// Snapshot encoding and restore behaviour
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotSettings {
    /// Emit indented JSON
    pub pretty: bool,
    /// Check table consistency when restoring instead of trusting the snapshot
    pub validate_on_restore: bool,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BayesError::Config(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| BayesError::Config(format!("Failed to parse settings: {}", e)))
    }
}
