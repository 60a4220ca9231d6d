use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::highlight::Highlight;
use super::style::Style;
use super::transform::RigidTransform;

/// Per-index color overrides for a structure's custom theme.
pub type ColorAssignment = BTreeMap<u32, Color>;

/// Raw structure text formats the engine can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    /// PDB text.
    #[default]
    Pdb,
    /// mmCIF text.
    Mmcif,
}

impl StructureFormat {
    /// Stable name used in signatures and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdb => "pdb",
            Self::Mmcif => "mmcif",
        }
    }
}

/// Desired state of one scene slot.
///
/// Slot identity is positional: the Nth descriptor in a list always
/// describes the Nth slot, and `None` in a list means the slot is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureDescriptor {
    /// Raw structure text. Empty content is treated as an empty slot.
    pub content: String,
    /// Format of `content`.
    pub format: StructureFormat,
    /// Visual style; baked into the built representation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    /// Per-index colors for a custom theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_assignment: Option<ColorAssignment>,
    /// Uniform color, and fallback for indices missing from
    /// `color_assignment`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color: Option<Color>,
    /// Ordered residue-range annotations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<Highlight>>,
    /// Rigid placement of the whole structure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<RigidTransform>,
}

impl StructureDescriptor {
    /// Descriptor for `content` in `format` with nothing else set.
    pub fn new(content: impl Into<String>, format: StructureFormat) -> Self {
        Self {
            content: content.into(),
            format,
            ..Self::default()
        }
    }

    /// Whether this descriptor has anything to build.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Same descriptor with a style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Same descriptor with a color assignment.
    #[must_use]
    pub fn with_color_assignment(mut self, assignment: ColorAssignment) -> Self {
        self.color_assignment = Some(assignment);
        self
    }

    /// Same descriptor with a base color.
    #[must_use]
    pub fn with_base_color(mut self, color: Color) -> Self {
        self.base_color = Some(color);
        self
    }

    /// Same descriptor with highlights.
    #[must_use]
    pub fn with_highlights(mut self, highlights: Vec<Highlight>) -> Self {
        self.highlights = Some(highlights);
        self
    }

    /// Same descriptor with a transform.
    #[must_use]
    pub fn with_transform(mut self, transform: RigidTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Theme inputs for this descriptor.
    #[must_use]
    pub fn theme_inputs(&self) -> ThemeInputs {
        ThemeInputs {
            assignment: self.color_assignment.clone(),
            base: self.base_color,
        }
    }
}

/// The `(color_assignment, base_color)` pair a slot's theme derives from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeInputs {
    /// Per-index overrides.
    pub assignment: Option<ColorAssignment>,
    /// Uniform/fallback color.
    pub base: Option<Color>,
}

impl ThemeInputs {
    /// Theme inputs for an optional descriptor (`None` slots have none).
    #[must_use]
    pub fn of(descriptor: Option<&StructureDescriptor>) -> Self {
        descriptor
            .map(StructureDescriptor::theme_inputs)
            .unwrap_or_default()
    }
}
