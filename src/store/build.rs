//! Structure build and rebuild.

use web_time::Instant;

use super::slot::SlotState;
use super::ViewerStore;
use crate::engine::{EngineFactory, SceneEngine};
use crate::error::EngineError;
use crate::options::SyncOptions;
use crate::scene::style::resolve_representation;
use crate::scene::{Color, StructureDescriptor};
use crate::theme::ThemeResolver;
use crate::util::signature::{signatures, Signature};

/// How a new signature list relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Same length, every signature equal.
    NoOp,
    /// Only new trailing slots differ.
    PureAddition,
    /// The list shrank, or a slot within the previous bounds changed.
    General,
}

/// Classify a signature transition.
#[must_use]
pub fn classify(prev: &[Signature], next: &[Signature]) -> ChangeKind {
    if next.len() < prev.len() {
        return ChangeKind::General;
    }
    if prev.iter().zip(next).any(|(a, b)| a != b) {
        return ChangeKind::General;
    }
    if next.len() > prev.len() {
        ChangeKind::PureAddition
    } else {
        ChangeKind::NoOp
    }
}

/// Outcome of [`ViewerStore::ensure_structures`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The engine is not initialized; nothing was done.
    NotReady,
    /// Nothing changed; no engine call was made.
    Unchanged,
    /// New trailing slots were built; existing slots were untouched.
    Extended {
        /// Structures built successfully.
        built: usize,
    },
    /// The scene was cleared and every slot rebuilt.
    Rebuilt {
        /// Structures built successfully.
        built: usize,
    },
}

impl<F: EngineFactory> ViewerStore<F> {
    /// Build, extend, or rebuild structures so the scene matches
    /// `descriptors`.
    ///
    /// `default_color`, when given, replaces the store's default color
    /// before anything is resolved. A slot that fails to build is logged
    /// and left empty; its siblings still build.
    pub async fn ensure_structures(
        &mut self,
        descriptors: &[Option<StructureDescriptor>],
        default_color: Option<Color>,
    ) -> Reconciliation {
        if let Some(color) = default_color {
            self.default_color = color;
        }
        let Self {
            engine,
            themes,
            slots,
            options,
            default_color,
            ..
        } = self;
        let Some(engine) = engine.as_mut() else {
            log::debug!("ensure_structures before init ignored");
            return Reconciliation::NotReady;
        };

        let next = signatures(descriptors);
        let prev: Vec<Signature> = slots.iter().map(|s| s.signature.clone()).collect();
        let kind = classify(&prev, &next);
        log::debug!(
            "structures: {kind:?} ({} -> {} slots)",
            prev.len(),
            next.len()
        );

        match kind {
            ChangeKind::NoOp => Reconciliation::Unchanged,
            ChangeKind::PureAddition => {
                engine.pause();
                let mut built = 0;
                let added = descriptors.iter().zip(next).enumerate().skip(prev.len());
                for (idx, (descriptor, signature)) in added {
                    let slot = build_slot(
                        engine,
                        themes,
                        options,
                        *default_color,
                        idx,
                        descriptor.as_ref(),
                        signature,
                    )
                    .await;
                    built += usize::from(slot.structure.is_some());
                    slots.push(slot);
                }
                engine.resume();
                Reconciliation::Extended { built }
            }
            ChangeKind::General => {
                let start = Instant::now();
                log::info!("rebuilding {} slots", descriptors.len());
                engine.pause();
                engine.clear();
                themes.release_all(engine);
                slots.clear();

                let mut built = 0;
                for (idx, (descriptor, signature)) in descriptors.iter().zip(next).enumerate() {
                    let slot = build_slot(
                        engine,
                        themes,
                        options,
                        *default_color,
                        idx,
                        descriptor.as_ref(),
                        signature,
                    )
                    .await;
                    built += usize::from(slot.structure.is_some());
                    slots.push(slot);
                }

                engine.reset_camera();
                engine.resume();
                log::info!(
                    "rebuilt {built}/{} slots in {:.1}ms",
                    slots.len(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
                Reconciliation::Rebuilt { built }
            }
        }
    }
}

/// Build one slot. Failures are logged and yield an empty slot that still
/// carries the new signature, so the same descriptor is not retried.
async fn build_slot<E: SceneEngine>(
    engine: &mut E,
    themes: &mut ThemeResolver,
    options: &SyncOptions,
    default_color: Color,
    idx: usize,
    descriptor: Option<&StructureDescriptor>,
    signature: Signature,
) -> SlotState<E> {
    let mut slot = SlotState::empty(signature);
    let Some(descriptor) = descriptor.filter(|d| d.has_content()) else {
        return slot;
    };

    let loaded = load_structure(engine, themes, options, default_color, idx, descriptor).await;
    let structure = match loaded {
        Ok(structure) => structure,
        Err(e) => {
            log::warn!("slot {idx}: build failed: {e}");
            return slot;
        }
    };
    slot.theme = descriptor.theme_inputs();

    if let Some(transform) = &descriptor.transform {
        let matrix = transform.to_matrix();
        match engine.insert_transform(&structure, matrix).await {
            Ok(node) => {
                slot.transform_node = Some(node);
                slot.transform = Some(*transform);
            }
            Err(e) => log::warn!("slot {idx}: transform failed: {e}"),
        }
    }
    slot.structure = Some(structure);
    slot
}

/// Resolve theme and representation, then hand the content to the engine.
/// The content handle is released whether or not the build succeeds.
async fn load_structure<E: SceneEngine>(
    engine: &mut E,
    themes: &mut ThemeResolver,
    options: &SyncOptions,
    default_color: Color,
    idx: usize,
    descriptor: &StructureDescriptor,
) -> Result<E::Structure, EngineError> {
    let inputs = descriptor.theme_inputs();
    let theme = themes.resolve(engine, idx, &inputs, default_color)?.theme;
    let representation =
        resolve_representation(descriptor.style.as_ref(), &options.representation);
    let content = engine.create_content(&descriptor.content)?;
    let built = engine
        .build_structure(content, descriptor.format, &representation, &theme)
        .await;
    engine.release_content(content);
    built
}
