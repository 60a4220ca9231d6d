use serde::{Deserialize, Serialize};

use super::color::Color;
use crate::error::SyncError;

/// Text annotation attached to a highlighted residue range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightLabel {
    /// Label text.
    pub text: String,
    /// Label color; also used to tint the highlighted region.
    pub color: Color,
    /// Label size factor (engine default `1.0` when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

impl PartialEq for HighlightLabel {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.color == other.color
            && match (self.scale, other.scale) {
                (Some(a), Some(b)) => same_f32(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// An inclusive residue range with a label and region tint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// First residue (inclusive).
    pub range_start: i32,
    /// Last residue (inclusive).
    pub range_end: i32,
    /// Label drawn over the range.
    pub label: HighlightLabel,
    /// Hidden highlights draw nothing but still count as content.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl Highlight {
    /// Visible highlight over `start..=end`.
    pub fn new(range_start: i32, range_end: i32, text: impl Into<String>, color: Color) -> Self {
        Self {
            range_start,
            range_end,
            label: HighlightLabel {
                text: text.into(),
                color,
                scale: None,
            },
            hidden: false,
        }
    }

    /// Same highlight with a label size factor.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.label.scale = Some(scale);
        self
    }

    /// Same highlight marked hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Whether the highlight produces a label and a region tint.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    /// Check the `range_start <= range_end` invariant.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidHighlight`] for an inverted range.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.range_start > self.range_end {
            return Err(SyncError::InvalidHighlight {
                start: self.range_start,
                end: self.range_end,
            });
        }
        Ok(())
    }
}

/// Float equality that treats every NaN as equal to every other NaN, so
/// value comparisons stay reflexive.
pub(crate) fn same_f32(a: f32, b: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}
