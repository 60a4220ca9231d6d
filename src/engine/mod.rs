//! Capability boundary between the reconciler and a 3D scene engine.
//!
//! The reconciler never sees an engine's concrete node types. It holds
//! opaque handles ([`SceneEngine::Structure`], [`SceneEngine::Node`],
//! [`SceneEngine::Label`]) and drives the engine through this narrow
//! interface: load, build and re-theme representations, select residue
//! ranges, overpaint, label, place, commit, and viewport control.
//!
//! Methods that may suspend (structure build, commits, label creation,
//! transform insertion) are `async`. The reconciler awaits each one before
//! issuing the next, so an engine only ever sees one call at a time.

pub mod recording;

use std::fmt;
use std::ops::RangeInclusive;

use glam::Mat4;

use crate::error::EngineError;
use crate::scene::{Color, Representation, StructureFormat};
use crate::theme::{IndexColorTheme, ThemeRef};

/// Transient engine-side resource wrapping raw structure text until the
/// load pipeline has consumed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHandle(pub u64);

/// Text, color, and size for a residue-range label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelParams {
    /// Label text.
    pub text: String,
    /// Text color.
    pub color: Color,
    /// Size factor.
    pub scale: f32,
}

/// One pending edit in a committed batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEdit<L, N> {
    /// Replace a label's text, color, and size in place.
    UpdateLabel {
        /// Label to update.
        label: L,
        /// New parameters.
        params: LabelParams,
    },
    /// Remove a label (its selection and its visual).
    DeleteLabel(L),
    /// Replace a transform node's matrix in place.
    UpdateTransform {
        /// Node to update.
        node: N,
        /// New rigid-body matrix.
        matrix: Mat4,
    },
    /// Remove a transform node, restoring the untransformed placement.
    DeleteNode(N),
}

/// Edit batch for engine `E`.
pub type EditBatch<E> =
    Vec<SceneEdit<<E as SceneEngine>::Label, <E as SceneEngine>::Node>>;

/// Operations the reconciler needs from a scene engine.
#[allow(async_fn_in_trait)]
pub trait SceneEngine {
    /// Drawing surface the engine renders into.
    type Surface: Clone + 'static;
    /// Parent element that hosts the surface.
    type Container: Clone + 'static;
    /// Handle to a built structure and its representation.
    type Structure: Clone + fmt::Debug;
    /// Handle to a transform node inserted over a structure.
    type Node: Clone + fmt::Debug;
    /// Handle to a label.
    type Label: Clone + fmt::Debug;
    /// Engine-native reference to a selected part of a structure.
    type Loci;

    /// One-time engine initialization.
    async fn init(&mut self) -> Result<(), EngineError>;

    /// Attach the engine to a display surface.
    async fn attach(
        &mut self,
        surface: &Self::Surface,
        container: &Self::Container,
    ) -> Result<(), EngineError>;

    /// Set the viewport background.
    fn set_background(&mut self, color: Color);

    /// Ask for a redraw on the next frame.
    fn request_draw(&mut self);

    /// Stop drawing until [`resume`](Self::resume).
    fn pause(&mut self);

    /// Resume drawing.
    fn resume(&mut self);

    /// Refit the camera to everything in the scene.
    fn reset_camera(&mut self);

    /// Remove every structure, label, and transform node.
    fn clear(&mut self);

    /// Tear the engine instance down.
    fn dispose(&mut self);

    /// Register a custom color theme by name. Registering an already
    /// registered name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the registry rejects the provider.
    fn register_color_theme(&mut self, theme: &IndexColorTheme) -> Result<(), EngineError>;

    /// Remove a custom color theme. Unknown names are ignored.
    fn unregister_color_theme(&mut self, name: &str);

    /// Hand raw structure text to the engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the engine cannot allocate the resource.
    fn create_content(&mut self, content: &str) -> Result<ContentHandle, EngineError>;

    /// Release a content handle once it has been consumed.
    fn release_content(&mut self, handle: ContentHandle);

    /// Parse content, build a representation with the given color theme,
    /// and commit it to the scene.
    async fn build_structure(
        &mut self,
        content: ContentHandle,
        format: StructureFormat,
        representation: &Representation,
        theme: &ThemeRef,
    ) -> Result<Self::Structure, EngineError>;

    /// Swap the color theme on a structure's representations without
    /// rebuilding geometry.
    async fn update_theme(
        &mut self,
        structure: &Self::Structure,
        theme: &ThemeRef,
    ) -> Result<(), EngineError>;

    /// Select residues by their sequence index range.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the structure is gone.
    fn select_residues(
        &self,
        structure: &Self::Structure,
        range: RangeInclusive<i32>,
    ) -> Result<Self::Loci, EngineError>;

    /// Remove every overpaint layer from a structure.
    async fn clear_overpaint(&mut self, structure: &Self::Structure) -> Result<(), EngineError>;

    /// Tint a selection on top of the structure's base theme. Later calls
    /// paint over earlier ones.
    async fn set_overpaint(
        &mut self,
        structure: &Self::Structure,
        loci: &Self::Loci,
        color: Color,
    ) -> Result<(), EngineError>;

    /// Attach a text label to a selection.
    async fn add_label(
        &mut self,
        loci: &Self::Loci,
        params: &LabelParams,
    ) -> Result<Self::Label, EngineError>;

    /// Insert a transform node above a structure and commit it.
    async fn insert_transform(
        &mut self,
        structure: &Self::Structure,
        matrix: Mat4,
    ) -> Result<Self::Node, EngineError>;

    /// Apply a batch of edits atomically.
    async fn commit(
        &mut self,
        edits: Vec<SceneEdit<Self::Label, Self::Node>>,
    ) -> Result<(), EngineError>;
}

/// Creates engine instances for a viewer store.
///
/// Any `Fn() -> E` closure is a factory.
pub trait EngineFactory {
    /// Engine this factory creates.
    type Engine: SceneEngine + 'static;

    /// Create a fresh, uninitialized engine.
    fn create(&self) -> Self::Engine;
}

impl<E, F> EngineFactory for F
where
    F: Fn() -> E,
    E: SceneEngine + 'static,
{
    type Engine = E;

    fn create(&self) -> E {
        self()
    }
}
