//! Value-equality gates for the skip-if-unchanged checks.
//!
//! Each predicate checks identity first and then compares field by field.
//! `None` and an empty collection are distinct values.

use crate::scene::{ColorAssignment, Highlight, RigidTransform, ThemeInputs};

fn same_ref<T: ?Sized>(a: &T, b: &T) -> bool {
    std::ptr::eq(a, b)
}

/// Highlight lists are equal when every highlight matches field by field.
#[must_use]
pub fn highlights_equal(a: Option<&[Highlight]>, b: Option<&[Highlight]>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            same_ref(a, b) || (a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y))
        }
        _ => false,
    }
}

/// Transforms are equal when position and rotation match exactly.
#[must_use]
pub fn transforms_equal(a: Option<&RigidTransform>, b: Option<&RigidTransform>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => same_ref(a, b) || a == b,
        _ => false,
    }
}

/// Color maps are equal when they hold the same keys with the same colors.
#[must_use]
pub fn color_maps_equal(a: Option<&ColorAssignment>, b: Option<&ColorAssignment>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            same_ref(a, b)
                || (a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v)))
        }
        _ => false,
    }
}

/// Theme inputs are equal when both the map and the base color match.
#[must_use]
pub fn theme_inputs_equal(a: &ThemeInputs, b: &ThemeInputs) -> bool {
    a.base == b.base && color_maps_equal(a.assignment.as_ref(), b.assignment.as_ref())
}
