//! Per-viewer store ownership for the declarative layer.
//!
//! A [`ViewerRegistry`] maps caller-chosen viewer ids to their
//! [`ViewerStore`]s. Each store is created on first access and lives until
//! [`destroy`](ViewerRegistry::destroy), so a viewer that re-renders keeps
//! its engine and bookkeeping, and two viewers never share either.
//!
//! The registry is an ordinary value: the caller owns it and passes it
//! wherever viewers are resolved.

use rustc_hash::FxHashMap;

use crate::engine::EngineFactory;
use crate::options::SyncOptions;
use crate::store::ViewerStore;

/// Viewer id to store map.
pub struct ViewerRegistry<F: EngineFactory + Clone> {
    factory: F,
    options: SyncOptions,
    viewers: FxHashMap<String, ViewerStore<F>>,
}

impl<F: EngineFactory + Clone> ViewerRegistry<F> {
    /// Registry whose stores use default options.
    pub fn new(factory: F) -> Self {
        Self::with_options(factory, SyncOptions::default())
    }

    /// Registry whose stores share `options`.
    pub fn with_options(factory: F, options: SyncOptions) -> Self {
        Self {
            factory,
            options,
            viewers: FxHashMap::default(),
        }
    }

    /// The store for `id`, created on first access.
    pub fn viewer(&mut self, id: &str) -> &mut ViewerStore<F> {
        self.viewers.entry(id.to_owned()).or_insert_with(|| {
            log::debug!("creating viewer store {id}");
            ViewerStore::with_options(self.factory.clone(), self.options.clone())
        })
    }

    /// The store for `id`, if it exists.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ViewerStore<F>> {
        self.viewers.get(id)
    }

    /// Mutable store for `id`, if it exists.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ViewerStore<F>> {
        self.viewers.get_mut(id)
    }

    /// Dispose the store for `id` and drop it. Returns whether it existed.
    pub fn destroy(&mut self, id: &str) -> bool {
        match self.viewers.remove(id) {
            Some(mut store) => {
                store.dispose();
                log::debug!("destroyed viewer store {id}");
                true
            }
            None => false,
        }
    }

    /// Whether a store exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.viewers.contains_key(id)
    }

    /// Number of live stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    /// Whether no store is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    /// Ids of live stores, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.viewers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::recording::{EngineOp, OpLog, RecordingEngine};
    use crate::options::InitOptions;
    use crate::scene::{Color, ColorAssignment, StructureDescriptor, StructureFormat};

    fn registry(log: &OpLog) -> ViewerRegistry<impl Fn() -> RecordingEngine + Clone> {
        let log = log.clone();
        ViewerRegistry::new(move || RecordingEngine::with_log(log.clone()))
    }

    #[test]
    fn viewer_is_created_once_per_id() {
        let log = OpLog::default();
        let mut reg = registry(&log);
        let first = reg.viewer("left").instance_id().to_owned();
        let again = reg.viewer("left").instance_id().to_owned();
        let other = reg.viewer("right").instance_id().to_owned();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.ids(), vec!["left", "right"]);
    }

    #[test]
    fn destroy_disposes_and_removes() {
        let log = OpLog::default();
        let mut reg = registry(&log);
        let store = reg.viewer("v");
        let opts = InitOptions::default();
        pollster::block_on(store.init(&(), &(), opts)).unwrap();
        let colors: ColorAssignment = [(0, Color::from_rgb(255, 0, 0))].into();
        let d = vec![Some(
            StructureDescriptor::new("ATOM", StructureFormat::Pdb)
                .with_color_assignment(colors),
        )];
        let _ = pollster::block_on(store.sync(&d, None));

        assert!(reg.destroy("v"));
        assert!(!reg.contains("v"));
        assert!(reg.is_empty());
        assert!(!reg.destroy("v"));

        let ops = log.snapshot();
        assert_eq!(ops.last(), Some(&EngineOp::Dispose));
        assert_eq!(
            ops.iter()
                .filter(|op| matches!(op, EngineOp::UnregisterTheme(_)))
                .count(),
            1
        );
    }

    #[test]
    fn viewers_do_not_share_state() {
        let log = OpLog::default();
        let mut reg = registry(&log);
        let opts = InitOptions::default();
        for id in ["a", "b"] {
            let store = reg.viewer(id);
            pollster::block_on(store.init(&(), &(), opts)).unwrap();
        }
        let d = vec![Some(StructureDescriptor::new("ATOM", StructureFormat::Pdb))];
        let _ = pollster::block_on(reg.viewer("a").sync(&d, None));

        assert_eq!(reg.get("a").map(ViewerStore::slot_count), Some(1));
        assert_eq!(reg.get("b").map(ViewerStore::slot_count), Some(0));
        assert!(reg.get_mut("b").is_some());
        assert!(reg.get("c").is_none());
    }
}
