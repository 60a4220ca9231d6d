use crate::engine::SceneEngine;
use crate::scene::{Highlight, RigidTransform, ThemeInputs};
use crate::util::signature::Signature;

/// Engine-side bookkeeping for one slot: what was last applied and the
/// handles that realize it.
pub(crate) struct SlotState<E: SceneEngine> {
    pub(crate) signature: Signature,
    pub(crate) structure: Option<E::Structure>,
    pub(crate) highlights: Option<Vec<Highlight>>,
    pub(crate) labels: Vec<E::Label>,
    pub(crate) transform: Option<RigidTransform>,
    pub(crate) transform_node: Option<E::Node>,
    pub(crate) theme: ThemeInputs,
}

impl<E: SceneEngine> SlotState<E> {
    /// Slot with nothing built (empty descriptor or failed build).
    pub(crate) fn empty(signature: Signature) -> Self {
        Self {
            signature,
            structure: None,
            highlights: None,
            labels: Vec::new(),
            transform: None,
            transform_node: None,
            theme: ThemeInputs::default(),
        }
    }
}
