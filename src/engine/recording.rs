//! In-memory [`SceneEngine`] that records every call.
//!
//! Nothing is rendered: structures, labels, transform nodes, and theme
//! registrations are kept as plain records, and each call appends an
//! [`EngineOp`] to a shared [`OpLog`]. Failures can be injected per
//! capability through [`FailurePlan`]. Used by the store tests and by the
//! replay binary.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;

use super::{ContentHandle, LabelParams, SceneEdit, SceneEngine};
use crate::error::{EngineError, EngineErrorKind};
use crate::scene::transform::translation_of;
use crate::scene::{Color, Representation, StructureFormat};
use crate::theme::{IndexColorTheme, ThemeRef};

/// Handle to a recorded structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructureId(pub u32);

/// Handle to a recorded transform node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Handle to a recorded label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

/// A recorded residue selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLoci {
    /// Structure the selection belongs to.
    pub structure: StructureId,
    /// Selected residue range.
    pub range: RangeInclusive<i32>,
}

/// One engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOp {
    /// `init`.
    Init,
    /// `attach`.
    Attach,
    /// `set_background`.
    SetBackground(Color),
    /// `request_draw`.
    RequestDraw,
    /// `pause`.
    Pause,
    /// `resume`.
    Resume,
    /// `reset_camera`.
    ResetCamera,
    /// `clear`.
    Clear,
    /// `dispose`.
    Dispose,
    /// `register_color_theme` (first registration of a name only).
    RegisterTheme(String),
    /// `unregister_color_theme`.
    UnregisterTheme(String),
    /// `create_content`.
    CreateContent(ContentHandle),
    /// `release_content`.
    ReleaseContent(ContentHandle),
    /// Successful `build_structure`.
    Build {
        /// New structure.
        structure: StructureId,
        /// Content format.
        format: StructureFormat,
        /// Representation type.
        representation: &'static str,
        /// Theme name.
        theme: String,
    },
    /// `update_theme`.
    UpdateTheme {
        /// Target structure.
        structure: StructureId,
        /// Theme name.
        theme: String,
        /// Base color.
        base: Color,
    },
    /// `clear_overpaint`.
    ClearOverpaint(StructureId),
    /// `set_overpaint`.
    SetOverpaint {
        /// Target structure.
        structure: StructureId,
        /// Tinted residues.
        range: RangeInclusive<i32>,
        /// Tint.
        color: Color,
    },
    /// `add_label`.
    AddLabel {
        /// New label.
        label: LabelId,
        /// Label text.
        text: String,
    },
    /// `insert_transform`.
    InsertTransform {
        /// Target structure.
        structure: StructureId,
        /// New node.
        node: NodeId,
        /// Translation of the inserted matrix.
        translation: Vec3,
    },
    /// A committed edit batch.
    Commit(Vec<SceneEdit<LabelId, NodeId>>),
}

impl EngineOp {
    /// Whether this call changes the scene or viewport.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Init | Self::Attach)
    }
}

/// Shared, clonable record of engine calls.
#[derive(Debug, Clone, Default)]
pub struct OpLog(Rc<RefCell<Vec<EngineOp>>>);

impl OpLog {
    fn push(&self, op: EngineOp) {
        self.0.borrow_mut().push(op);
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&EngineOp) -> bool) -> usize {
        self.0.borrow().iter().filter(|op| pred(op)).count()
    }

    /// Copy of every recorded call.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EngineOp> {
        self.0.borrow().clone()
    }

    /// Drain every recorded call.
    #[must_use]
    pub fn take(&self) -> Vec<EngineOp> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Which capabilities should fail.
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FailurePlan {
    /// Fail `init`.
    pub init: bool,
    /// Fail `attach`.
    pub attach: bool,
    /// Fail `build_structure` for content containing this marker.
    pub load_marker: Option<String>,
    /// Fail `select_residues`.
    pub selection: bool,
    /// Fail `commit`.
    pub commit: bool,
    /// Fail `update_theme`.
    pub theme_update: bool,
}

/// A structure held by the recording engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStructure {
    /// Content format.
    pub format: StructureFormat,
    /// Representation type.
    pub representation: &'static str,
    /// Current theme.
    pub theme: ThemeRef,
    /// Overpaint layers in application order.
    pub overpaint: Vec<(RangeInclusive<i32>, Color)>,
}

/// A label held by the recording engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedLabel {
    /// Labelled selection.
    pub loci: RecordedLoci,
    /// Current parameters.
    pub params: LabelParams,
}

/// The in-memory engine.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    log: OpLog,
    failures: FailurePlan,
    next_id: u32,
    next_content: u64,
    disposed: bool,
    paused: bool,
    background: Option<Color>,
    contents: FxHashMap<u64, String>,
    structures: BTreeMap<StructureId, RecordedStructure>,
    labels: BTreeMap<LabelId, RecordedLabel>,
    nodes: BTreeMap<NodeId, (StructureId, Mat4)>,
    themes: BTreeMap<String, IndexColorTheme>,
}

impl RecordingEngine {
    /// Engine with its own log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine appending to a shared log.
    #[must_use]
    pub fn with_log(log: OpLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Same engine with injected failures.
    #[must_use]
    pub fn with_failures(mut self, failures: FailurePlan) -> Self {
        self.failures = failures;
        self
    }

    /// Recorded calls.
    #[must_use]
    pub fn log(&self) -> &OpLog {
        &self.log
    }

    /// Change injected failures.
    pub fn failures_mut(&mut self) -> &mut FailurePlan {
        &mut self.failures
    }

    /// Built structures in creation order.
    #[must_use]
    pub fn structures(&self) -> Vec<(StructureId, &RecordedStructure)> {
        self.structures.iter().map(|(&id, s)| (id, s)).collect()
    }

    /// One structure.
    #[must_use]
    pub fn structure(&self, id: StructureId) -> Option<&RecordedStructure> {
        self.structures.get(&id)
    }

    /// Labels in creation order.
    #[must_use]
    pub fn labels(&self) -> Vec<(LabelId, &RecordedLabel)> {
        self.labels.iter().map(|(&id, l)| (id, l)).collect()
    }

    /// Transform node matrix.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&(StructureId, Mat4)> {
        self.nodes.get(&id)
    }

    /// Number of transform nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A registered custom theme.
    #[must_use]
    pub fn theme(&self, name: &str) -> Option<&IndexColorTheme> {
        self.themes.get(name)
    }

    /// Names of registered custom themes, sorted.
    #[must_use]
    pub fn registered_theme_names(&self) -> Vec<String> {
        self.themes.keys().cloned().collect()
    }

    /// Content handles created and not yet released.
    #[must_use]
    pub fn live_content_count(&self) -> usize {
        self.contents.len()
    }

    /// Current background.
    #[must_use]
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Whether drawing is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_live(&self) -> Result<(), EngineError> {
        if self.disposed {
            return Err(EngineError::new(
                EngineErrorKind::Disposed,
                "engine was disposed",
            ));
        }
        Ok(())
    }

    fn structure_mut(
        &mut self,
        id: StructureId,
        kind: EngineErrorKind,
    ) -> Result<&mut RecordedStructure, EngineError> {
        self.structures.get_mut(&id).ok_or_else(|| {
            EngineError::new(kind, format!("unknown structure {}", id.0))
        })
    }

    fn check_edit(&self, edit: &SceneEdit<LabelId, NodeId>) -> Result<(), EngineError> {
        let known = match edit {
            SceneEdit::UpdateLabel { label, .. } | SceneEdit::DeleteLabel(label) => {
                self.labels.contains_key(label)
            }
            SceneEdit::UpdateTransform { node, .. } | SceneEdit::DeleteNode(node) => {
                self.nodes.contains_key(node)
            }
        };
        if known {
            Ok(())
        } else {
            Err(EngineError::new(
                EngineErrorKind::Commit,
                format!("edit targets a missing node: {edit:?}"),
            ))
        }
    }
}

impl SceneEngine for RecordingEngine {
    type Surface = ();
    type Container = ();
    type Structure = StructureId;
    type Node = NodeId;
    type Label = LabelId;
    type Loci = RecordedLoci;

    async fn init(&mut self) -> Result<(), EngineError> {
        self.log.push(EngineOp::Init);
        if self.failures.init {
            return Err(EngineError::new(
                EngineErrorKind::Init,
                "injected init failure",
            ));
        }
        Ok(())
    }

    async fn attach(&mut self, _surface: &(), _container: &()) -> Result<(), EngineError> {
        self.log.push(EngineOp::Attach);
        if self.failures.attach {
            return Err(EngineError::new(
                EngineErrorKind::Attach,
                "injected attach failure",
            ));
        }
        Ok(())
    }

    fn set_background(&mut self, color: Color) {
        self.log.push(EngineOp::SetBackground(color));
        self.background = Some(color);
    }

    fn request_draw(&mut self) {
        self.log.push(EngineOp::RequestDraw);
    }

    fn pause(&mut self) {
        self.log.push(EngineOp::Pause);
        self.paused = true;
    }

    fn resume(&mut self) {
        self.log.push(EngineOp::Resume);
        self.paused = false;
    }

    fn reset_camera(&mut self) {
        self.log.push(EngineOp::ResetCamera);
    }

    fn clear(&mut self) {
        self.log.push(EngineOp::Clear);
        self.structures.clear();
        self.labels.clear();
        self.nodes.clear();
    }

    fn dispose(&mut self) {
        self.log.push(EngineOp::Dispose);
        self.clear_all();
    }

    fn register_color_theme(&mut self, theme: &IndexColorTheme) -> Result<(), EngineError> {
        self.ensure_live()?;
        let name = theme.name();
        if !self.themes.contains_key(name) {
            self.log.push(EngineOp::RegisterTheme(name.to_owned()));
            let _ = self.themes.insert(name.to_owned(), theme.clone());
        }
        Ok(())
    }

    fn unregister_color_theme(&mut self, name: &str) {
        if self.themes.remove(name).is_some() {
            self.log.push(EngineOp::UnregisterTheme(name.to_owned()));
        }
    }

    fn create_content(&mut self, content: &str) -> Result<ContentHandle, EngineError> {
        self.ensure_live()?;
        self.next_content += 1;
        let handle = ContentHandle(self.next_content);
        let _ = self.contents.insert(handle.0, content.to_owned());
        self.log.push(EngineOp::CreateContent(handle));
        Ok(handle)
    }

    fn release_content(&mut self, handle: ContentHandle) {
        if self.contents.remove(&handle.0).is_some() {
            self.log.push(EngineOp::ReleaseContent(handle));
        }
    }

    async fn build_structure(
        &mut self,
        content: ContentHandle,
        format: StructureFormat,
        representation: &Representation,
        theme: &ThemeRef,
    ) -> Result<StructureId, EngineError> {
        self.ensure_live()?;
        let text = self.contents.get(&content.0).ok_or_else(|| {
            EngineError::new(EngineErrorKind::Load, "content handle was released")
        })?;
        if let Some(marker) = &self.failures.load_marker {
            if text.contains(marker.as_str()) {
                return Err(EngineError::new(
                    EngineErrorKind::Load,
                    format!("cannot parse {} content", format.as_str()),
                ));
            }
        }
        if !theme.is_uniform() && !self.themes.contains_key(&theme.name) {
            return Err(EngineError::new(
                EngineErrorKind::Theme,
                format!("unknown color theme {}", theme.name),
            ));
        }
        let id = StructureId(self.next_id());
        let _ = self.structures.insert(
            id,
            RecordedStructure {
                format,
                representation: representation.name,
                theme: theme.clone(),
                overpaint: Vec::new(),
            },
        );
        self.log.push(EngineOp::Build {
            structure: id,
            format,
            representation: representation.name,
            theme: theme.name.clone(),
        });
        Ok(id)
    }

    async fn update_theme(
        &mut self,
        structure: &StructureId,
        theme: &ThemeRef,
    ) -> Result<(), EngineError> {
        if self.failures.theme_update {
            return Err(EngineError::new(
                EngineErrorKind::Theme,
                "injected theme failure",
            ));
        }
        let record = self.structure_mut(*structure, EngineErrorKind::Theme)?;
        record.theme = theme.clone();
        self.log.push(EngineOp::UpdateTheme {
            structure: *structure,
            theme: theme.name.clone(),
            base: theme.base,
        });
        Ok(())
    }

    fn select_residues(
        &self,
        structure: &StructureId,
        range: RangeInclusive<i32>,
    ) -> Result<RecordedLoci, EngineError> {
        if self.failures.selection || !self.structures.contains_key(structure) {
            return Err(EngineError::new(
                EngineErrorKind::Selection,
                format!("cannot select {range:?} on structure {}", structure.0),
            ));
        }
        Ok(RecordedLoci {
            structure: *structure,
            range,
        })
    }

    async fn clear_overpaint(&mut self, structure: &StructureId) -> Result<(), EngineError> {
        self.structure_mut(*structure, EngineErrorKind::Commit)?
            .overpaint
            .clear();
        self.log.push(EngineOp::ClearOverpaint(*structure));
        Ok(())
    }

    async fn set_overpaint(
        &mut self,
        structure: &StructureId,
        loci: &RecordedLoci,
        color: Color,
    ) -> Result<(), EngineError> {
        self.structure_mut(*structure, EngineErrorKind::Commit)?
            .overpaint
            .push((loci.range.clone(), color));
        self.log.push(EngineOp::SetOverpaint {
            structure: *structure,
            range: loci.range.clone(),
            color,
        });
        Ok(())
    }

    async fn add_label(
        &mut self,
        loci: &RecordedLoci,
        params: &LabelParams,
    ) -> Result<LabelId, EngineError> {
        self.ensure_live()?;
        let id = LabelId(self.next_id());
        let _ = self.labels.insert(
            id,
            RecordedLabel {
                loci: loci.clone(),
                params: params.clone(),
            },
        );
        self.log.push(EngineOp::AddLabel {
            label: id,
            text: params.text.clone(),
        });
        Ok(id)
    }

    async fn insert_transform(
        &mut self,
        structure: &StructureId,
        matrix: Mat4,
    ) -> Result<NodeId, EngineError> {
        let _ = self.structure_mut(*structure, EngineErrorKind::Commit)?;
        let id = NodeId(self.next_id());
        let _ = self.nodes.insert(id, (*structure, matrix));
        self.log.push(EngineOp::InsertTransform {
            structure: *structure,
            node: id,
            translation: translation_of(&matrix),
        });
        Ok(id)
    }

    async fn commit(&mut self, edits: Vec<SceneEdit<LabelId, NodeId>>) -> Result<(), EngineError> {
        if self.failures.commit {
            return Err(EngineError::new(
                EngineErrorKind::Commit,
                "injected commit failure",
            ));
        }
        for edit in &edits {
            self.check_edit(edit)?;
        }
        for edit in &edits {
            match edit {
                SceneEdit::UpdateLabel { label, params } => {
                    if let Some(record) = self.labels.get_mut(label) {
                        record.params = params.clone();
                    }
                }
                SceneEdit::DeleteLabel(label) => {
                    let _ = self.labels.remove(label);
                }
                SceneEdit::UpdateTransform { node, matrix } => {
                    if let Some(record) = self.nodes.get_mut(node) {
                        record.1 = *matrix;
                    }
                }
                SceneEdit::DeleteNode(node) => {
                    let _ = self.nodes.remove(node);
                }
            }
        }
        self.log.push(EngineOp::Commit(edits));
        Ok(())
    }
}

impl RecordingEngine {
    fn clear_all(&mut self) {
        self.disposed = true;
        self.structures.clear();
        self.labels.clear();
        self.nodes.clear();
        self.contents.clear();
    }
}
