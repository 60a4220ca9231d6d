use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scene::Color;

/// Fallback colors used when descriptors and init options leave them unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Colors", inline)]
#[serde(default)]
pub struct ColorOptions {
    /// Uniform color for structures without a base color.
    #[schemars(title = "Default Structure Color")]
    pub default_structure: Color,
    /// Viewport background.
    #[schemars(title = "Background")]
    pub background: Color,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            default_structure: Color::DEFAULT_STRUCTURE,
            background: Color::DEFAULT_BACKGROUND,
        }
    }
}
