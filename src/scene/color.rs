use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SyncError;

/// An opaque sRGB color, stored as `0xRRGGBB`.
///
/// Serializes as a CSS-style hex string (`"#94a3b8"`). Parsing accepts
/// `#rrggbb`, `#rgb`, and the same forms without the leading `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    /// Neutral slate used for structures when nothing else is configured.
    pub const DEFAULT_STRUCTURE: Self = Self(0x0094_a3b8);
    /// Light gray viewport background.
    pub const DEFAULT_BACKGROUND: Self = Self(0x00f4_f4f4);

    /// Build from 8-bit channels.
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Parse a hex color string.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ColorParse`] when the string is not 3 or 6 hex
    /// digits.
    pub fn from_hex(s: &str) -> Result<Self, SyncError> {
        let digits = s.trim().trim_start_matches('#');
        let bad = || SyncError::ColorParse(s.to_owned());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        match digits.len() {
            6 => u32::from_str_radix(digits, 16).map(Self).map_err(|_| bad()),
            3 => {
                let short = u32::from_str_radix(digits, 16).map_err(|_| bad())?;
                let r = (short >> 8) & 0xf;
                let g = (short >> 4) & 0xf;
                let b = short & 0xf;
                Ok(Self(((r * 0x11) << 16) | ((g * 0x11) << 8) | (b * 0x11)))
            }
            _ => Err(bad()),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT_STRUCTURE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Color {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for Color {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "Color".into()
    }

    fn json_schema(_gen: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "string",
            "format": "color",
            "pattern": "^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$"
        })
    }
}
