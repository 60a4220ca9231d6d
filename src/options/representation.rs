use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Representation", inline)]
#[serde(default)]
/// Default parameters layered under each style's own params.
pub struct RepresentationOptions {
    /// Molecular surface grid resolution.
    #[schemars(title = "Surface Resolution", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub surface_resolution: f64,
    /// Molecular surface solvent probe radius.
    #[schemars(title = "Probe Radius", range(min = 0.0, max = 4.0), extend("step" = 0.1))]
    pub surface_probe_radius: f64,
    /// Ribbon width multiplier.
    #[schemars(title = "Ribbon Size", range(min = 0.5, max = 6.0), extend("step" = 0.1))]
    pub ribbon_size_factor: f64,
}

impl Default for RepresentationOptions {
    fn default() -> Self {
        Self {
            surface_resolution: 0.5,
            surface_probe_radius: 1.4,
            ribbon_size_factor: 3.0,
        }
    }
}
