//! Visual style descriptions and their mapping to engine representations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::options::RepresentationOptions;

/// Friendly style names accepted from the declarative layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum StyleKind {
    /// Van der Waals spheres.
    Spacefill,
    /// Atoms as balls, bonds as sticks.
    BallAndStick,
    /// Solvent-excluded molecular surface.
    Surface,
    /// Cartoon ribbon.
    Ribbon,
    /// Any style name this crate does not know.
    #[serde(other)]
    Unrecognized,
}

impl StyleKind {
    /// Stable name used in signatures and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spacefill => "spacefill",
            Self::BallAndStick => "ball-and-stick",
            Self::Surface => "surface",
            Self::Ribbon => "ribbon",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Style kind plus free-form engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Which representation family.
    pub kind: StyleKind,
    /// Parameters merged over the representation's defaults.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl Style {
    /// Style with no parameter overrides.
    #[must_use]
    pub fn new(kind: StyleKind) -> Self {
        Self {
            kind,
            params: Map::new(),
        }
    }

    /// Add one parameter override.
    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        let _ = self.params.insert(key.to_owned(), value.into());
        self
    }
}

/// Engine representation to build for a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    /// Engine representation type name.
    pub name: &'static str,
    /// Fully merged parameters.
    pub params: Map<String, Value>,
}

/// Baseline representation for absent or unknown styles.
pub const BASELINE_REPRESENTATION: &str = "ribbon";

/// Map a style to the representation the engine should build.
///
/// `surface` and `ribbon` get configured defaults underneath the caller's
/// params; absent or unrecognized styles fall back to a plain ribbon.
#[must_use]
pub fn resolve_representation(
    style: Option<&Style>,
    opts: &RepresentationOptions,
) -> Representation {
    let Some(style) = style else {
        return baseline();
    };
    match style.kind {
        StyleKind::Surface => {
            let mut params = Map::new();
            let _ = params
                .insert("resolution".to_owned(), opts.surface_resolution.into());
            let _ = params.insert(
                "probeRadius".to_owned(),
                opts.surface_probe_radius.into(),
            );
            merge(&mut params, &style.params);
            Representation {
                name: "molecular-surface",
                params,
            }
        }
        StyleKind::Ribbon => {
            let mut params = Map::new();
            let _ = params
                .insert("sizeFactor".to_owned(), opts.ribbon_size_factor.into());
            merge(&mut params, &style.params);
            Representation {
                name: BASELINE_REPRESENTATION,
                params,
            }
        }
        StyleKind::Spacefill => Representation {
            name: "spacefill",
            params: style.params.clone(),
        },
        StyleKind::BallAndStick => Representation {
            name: "ball-and-stick",
            params: style.params.clone(),
        },
        StyleKind::Unrecognized => {
            log::debug!("unrecognized style, using {BASELINE_REPRESENTATION}");
            baseline()
        }
    }
}

fn baseline() -> Representation {
    Representation {
        name: BASELINE_REPRESENTATION,
        params: Map::new(),
    }
}

fn merge(into: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (k, v) in overrides {
        let _ = into.insert(k.clone(), v.clone());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn absent_style_is_plain_ribbon() {
        let rep = resolve_representation(None, &RepresentationOptions::default());
        assert_eq!(rep.name, "ribbon");
        assert!(rep.params.is_empty());
    }

    #[test]
    fn surface_defaults_are_overridable() {
        let style = Style::new(StyleKind::Surface).with_param("probeRadius", 2.0);
        let rep = resolve_representation(Some(&style), &RepresentationOptions::default());
        assert_eq!(rep.name, "molecular-surface");
        assert_eq!(rep.params["resolution"], json!(0.5));
        assert_eq!(rep.params["probeRadius"], json!(2.0));
    }

    #[test]
    fn ribbon_gets_size_factor() {
        let rep = resolve_representation(
            Some(&Style::new(StyleKind::Ribbon)),
            &RepresentationOptions::default(),
        );
        assert_eq!(rep.params["sizeFactor"], json!(3.0));
    }

    #[test]
    fn unknown_style_name_deserializes_to_baseline() {
        let style: Style = serde_json::from_str(r#"{"kind":"cartoon-ish"}"#).unwrap();
        assert_eq!(style.kind, StyleKind::Unrecognized);
        let rep = resolve_representation(Some(&style), &RepresentationOptions::default());
        assert_eq!(rep.name, BASELINE_REPRESENTATION);
        assert!(rep.params.is_empty());
    }

    #[test]
    fn ball_and_stick_passes_params_through() {
        let style: Style = serde_json::from_str(
            r#"{"kind":"ball-and-stick","params":{"sizeFactor":0.2}}"#,
        )
        .unwrap();
        let rep = resolve_representation(Some(&style), &RepresentationOptions::default());
        assert_eq!(rep.name, "ball-and-stick");
        assert_eq!(rep.params["sizeFactor"], json!(0.2));
    }
}
