use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Labels", inline)]
#[serde(default)]
/// Highlight label defaults.
pub struct LabelOptions {
    /// Size factor for labels that do not set one.
    #[schemars(title = "Default Scale", range(min = 0.1, max = 5.0), extend("step" = 0.1))]
    pub default_scale: f32,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self { default_scale: 1.0 }
    }
}
