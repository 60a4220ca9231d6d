//! Cheap content fingerprints for deciding when a slot must be rebuilt.
//!
//! A signature samples the content instead of hashing all of it: format,
//! byte length, the first and last [`SAMPLE_CHARS`] characters, and the
//! serialized style. The sample misses only edits that keep the length and
//! both ends unchanged. Style is part of the key since it is baked into the
//! built representation.

use std::fmt;

use crate::scene::StructureDescriptor;

/// Number of leading and trailing characters sampled from the content.
pub const SAMPLE_CHARS: usize = 32;

/// Opaque per-slot fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    /// Signature of an empty slot. Parameterized by index so an empty slot
    /// never matches a populated one elsewhere.
    #[must_use]
    pub fn empty(index: usize) -> Self {
        Self(format!("empty:{index}"))
    }

    /// Whether this is an empty-slot sentinel.
    #[must_use]
    pub fn is_empty_slot(&self) -> bool {
        self.0.starts_with("empty:")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint one slot.
#[must_use]
pub fn signature(descriptor: Option<&StructureDescriptor>, index: usize) -> Signature {
    let Some(d) = descriptor.filter(|d| d.has_content()) else {
        return Signature::empty(index);
    };
    let style_key = d.style.as_ref().map_or_else(
        || "default".to_owned(),
        |s| {
            let params = serde_json::to_string(&s.params).unwrap_or_default();
            format!("{}:{params}", s.kind.as_str())
        },
    );
    Signature(format!(
        "{}:{index}:{}:{}:{}:{style_key}",
        d.format.as_str(),
        d.content.len(),
        head(&d.content, SAMPLE_CHARS),
        tail(&d.content, SAMPLE_CHARS),
    ))
}

/// Fingerprint a whole descriptor list.
#[must_use]
pub fn signatures(descriptors: &[Option<StructureDescriptor>]) -> Vec<Signature> {
    descriptors
        .iter()
        .enumerate()
        .map(|(i, d)| signature(d.as_ref(), i))
        .collect()
}

fn head(s: &str, n: usize) -> &str {
    s.char_indices().nth(n).map_or(s, |(i, _)| &s[..i])
}

fn tail(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    s.char_indices()
        .rev()
        .nth(n - 1)
        .map_or(s, |(i, _)| &s[i..])
}
