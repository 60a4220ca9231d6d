//! Value-level description of the scene the caller wants.
//!
//! Everything here is plain data: descriptors are compared by value, never
//! by identity. The [`store`](crate::store) owns the engine handles that
//! realize these descriptions.

mod color;
mod descriptor;
mod highlight;
pub mod style;
pub mod transform;

pub use color::Color;
pub use descriptor::{
    ColorAssignment, StructureDescriptor, StructureFormat, ThemeInputs,
};
pub use highlight::{Highlight, HighlightLabel};
pub use style::{Representation, Style, StyleKind};
pub use transform::{RigidTransform, Xyz};
