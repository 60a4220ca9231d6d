//! The reconciliation store: keeps an engine scene in step with a list of
//! structure descriptors.
//!
//! Each update cycle the caller hands over the full descriptor list. The
//! store compares it with what it last applied, slot by slot, and issues the
//! smallest set of engine operations that realizes it:
//!
//! - [`ensure_structures`](ViewerStore::ensure_structures) builds, extends,
//!   or fully rebuilds structures when their signatures change.
//! - [`apply_transforms`](ViewerStore::apply_transforms),
//!   [`apply_themes`](ViewerStore::apply_themes), and
//!   [`apply_highlights`](ViewerStore::apply_highlights) mutate already
//!   built structures in place.
//!
//! `ensure_structures` must finish before the three `apply_*` calls of the
//! same cycle; [`sync`](ViewerStore::sync) runs all four in that order.
//! Slots are always processed in ascending index order, one at a time.

mod build;
mod highlights;
mod lifecycle;
mod slot;
mod snapshot;
mod themes;
mod transforms;

pub use build::{classify, ChangeKind, Reconciliation};
pub use snapshot::{ListenerId, ViewerSnapshot};

use self::lifecycle::InitState;
use self::slot::SlotState;
use self::snapshot::SnapshotCell;
use crate::engine::{EngineFactory, SceneEngine};
use crate::options::SyncOptions;
use crate::scene::{Color, StructureDescriptor};
use crate::theme::ThemeResolver;

/// Engine type produced by factory `F`.
pub type EngineOf<F> = <F as EngineFactory>::Engine;

/// State owner for one viewer instance.
///
/// Owns the engine (once initialized), per-slot bookkeeping, the custom
/// theme registrations, and the readiness snapshot. Every method takes
/// `&mut self`, so at most one reconciliation cycle can be in flight.
pub struct ViewerStore<F: EngineFactory> {
    factory: F,
    instance_id: String,
    options: SyncOptions,
    default_color: Color,
    engine: Option<EngineOf<F>>,
    init_state: InitState<EngineOf<F>>,
    slots: Vec<SlotState<EngineOf<F>>>,
    themes: ThemeResolver,
    snapshot: SnapshotCell,
}

impl<F: EngineFactory> ViewerStore<F> {
    /// Store with default options.
    pub fn new(factory: F) -> Self {
        Self::with_options(factory, SyncOptions::default())
    }

    /// Store with explicit options.
    pub fn with_options(factory: F, options: SyncOptions) -> Self {
        let instance_id = format!("{:032x}", rand::random::<u128>());
        let themes = ThemeResolver::new(&instance_id);
        Self {
            factory,
            default_color: options.colors.default_structure,
            instance_id,
            options,
            engine: None,
            init_state: InitState::Idle,
            slots: Vec::new(),
            themes,
            snapshot: SnapshotCell::default(),
        }
    }

    /// Random identifier namespacing this instance's engine registrations.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Active options.
    #[must_use]
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Color used for slots without a base color.
    #[must_use]
    pub fn default_color(&self) -> Color {
        self.default_color
    }

    /// Current read model.
    #[must_use]
    pub fn snapshot(&self) -> ViewerSnapshot {
        self.snapshot.get()
    }

    /// Call `listener` whenever the snapshot changes.
    pub fn subscribe(&mut self, listener: impl FnMut(ViewerSnapshot) + 'static) -> ListenerId {
        self.snapshot.subscribe(Box::new(listener))
    }

    /// Stop notifying a listener. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.snapshot.unsubscribe(id)
    }

    /// Number of active listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.snapshot.listener_count()
    }

    /// The engine, once initialized.
    #[must_use]
    pub fn engine(&self) -> Option<&EngineOf<F>> {
        self.engine.as_ref()
    }

    /// Mutable engine access, once initialized.
    pub fn engine_mut(&mut self) -> Option<&mut EngineOf<F>> {
        self.engine.as_mut()
    }

    /// Number of slots tracked since the last rebuild.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Handle of the structure built for a slot.
    #[must_use]
    pub fn structure(&self, slot: usize) -> Option<&<EngineOf<F> as SceneEngine>::Structure> {
        self.slots.get(slot).and_then(|s| s.structure.as_ref())
    }

    /// Handle of the transform node on a slot.
    #[must_use]
    pub fn transform_node(&self, slot: usize) -> Option<&<EngineOf<F> as SceneEngine>::Node> {
        self.slots.get(slot).and_then(|s| s.transform_node.as_ref())
    }

    /// Label handles on a slot.
    #[must_use]
    pub fn labels(&self, slot: usize) -> &[<EngineOf<F> as SceneEngine>::Label] {
        self.slots
            .get(slot)
            .map_or(&[][..], |s| s.labels.as_slice())
    }

    /// Custom color themes this instance has registered.
    #[must_use]
    pub fn theme_names(&self) -> Vec<String> {
        self.themes.registered_names()
    }

    /// Set the viewport background. No-op before init.
    pub fn set_background(&mut self, color: Color) {
        let Some(engine) = self.engine.as_mut() else {
            log::debug!("set_background before init ignored");
            return;
        };
        engine.set_background(color);
        engine.request_draw();
    }

    /// One full update cycle: structures, then transforms, themes, and
    /// highlights.
    pub async fn sync(
        &mut self,
        descriptors: &[Option<StructureDescriptor>],
        default_color: Option<Color>,
    ) -> Reconciliation {
        let outcome = self.ensure_structures(descriptors, default_color).await;
        self.apply_transforms(descriptors).await;
        self.apply_themes(descriptors).await;
        self.apply_highlights(descriptors).await;
        outcome
    }
}
