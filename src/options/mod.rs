//! Reconciler configuration with TOML file support.
//!
//! Fallback colors, representation defaults, and label defaults live here.
//! Every sub-struct uses `#[serde(default)]`, so a TOML file only needs the
//! keys it overrides.

mod colors;
mod labels;
mod representation;

use std::path::Path;

pub use colors::ColorOptions;
pub use labels::LabelOptions;
pub use representation::RepresentationOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::scene::Color;

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct SyncOptions {
    /// Fallback colors.
    pub colors: ColorOptions,
    /// Representation parameter defaults.
    pub representation: RepresentationOptions,
    /// Highlight label defaults.
    pub labels: LabelOptions,
}

impl SyncOptions {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(SyncOptions)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if the file cannot be read and
    /// [`SyncError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| SyncError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] on serialization or I/O failure.
    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SyncError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Per-`init` overrides supplied by the declarative layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Viewport background.
    pub background: Option<Color>,
    /// Default structure color.
    pub default_color: Option<Color>,
}
