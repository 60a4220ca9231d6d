//! Shared helpers for the reconciler: slot signatures and the value-equality
//! predicates that gate incremental updates.

pub mod equality;
pub mod signature;
