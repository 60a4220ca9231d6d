// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Engines are single-threaded; store futures hold `Rc` handles
#![allow(clippy::future_not_send)]

//! Declarative-to-imperative scene reconciliation for molecular viewers.
//!
//! A caller describes the structures a viewer should show as a list of
//! [`scene::StructureDescriptor`]s: raw structure text, style, per-residue
//! colors, highlights, and a rigid-body transform. On every update the
//! [`store::ViewerStore`] diffs that list against what it last applied and
//! drives a [`engine::SceneEngine`] with the smallest set of operations:
//! nothing, an in-place recolor/relabel/retransform, or a rebuild.
//!
//! # Key entry points
//!
//! - [`store::ViewerStore`] - per-viewer reconciler (`init`, `sync`,
//!   `ensure_structures`, `apply_*`, `dispose`)
//! - [`binding::ViewerRegistry`] - viewer id to store map
//! - [`engine::SceneEngine`] - the capability interface an engine adapter
//!   implements; [`engine::recording::RecordingEngine`] is an in-memory one
//! - [`options::SyncOptions`] - fallback colors and representation defaults
//!
//! # Update cycle
//!
//! Structures are ensured first, then transforms, themes, and highlights
//! are applied against the handles that step produced. Slots are positional
//! and processed in ascending order, each awaited to completion before the
//! next begins.

pub mod binding;
pub mod engine;
pub mod error;
pub mod options;
pub mod scene;
pub mod store;
pub mod theme;
pub mod util;
