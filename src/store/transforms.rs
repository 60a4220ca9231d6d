//! Rigid-body placement of built structures.

use super::ViewerStore;
use crate::engine::{EngineFactory, SceneEdit, SceneEngine};
use crate::scene::StructureDescriptor;
use crate::util::equality::transforms_equal;

impl<F: EngineFactory> ViewerStore<F> {
    /// Insert, update, or remove each slot's transform node so it matches
    /// the slot's transform. Geometry is never rebuilt.
    pub async fn apply_transforms(&mut self, descriptors: &[Option<StructureDescriptor>]) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let mut touched = false;
        for (idx, (slot, descriptor)) in self.slots.iter_mut().zip(descriptors).enumerate() {
            let next = descriptor.as_ref().and_then(|d| d.transform);
            if transforms_equal(next.as_ref(), slot.transform.as_ref()) {
                continue;
            }

            match (slot.transform_node.clone(), next) {
                (Some(node), Some(transform)) => {
                    touched = true;
                    let edit = SceneEdit::UpdateTransform {
                        node,
                        matrix: transform.to_matrix(),
                    };
                    match engine.commit(vec![edit]).await {
                        Ok(()) => slot.transform = Some(transform),
                        Err(e) => log::warn!("slot {idx}: transform update failed: {e}"),
                    }
                }
                (None, Some(transform)) => {
                    let Some(structure) = slot.structure.as_ref() else {
                        continue;
                    };
                    touched = true;
                    let matrix = transform.to_matrix();
                    match engine.insert_transform(structure, matrix).await {
                        Ok(node) => {
                            slot.transform_node = Some(node);
                            slot.transform = Some(transform);
                        }
                        Err(e) => log::warn!("slot {idx}: transform insert failed: {e}"),
                    }
                }
                (Some(node), None) => {
                    touched = true;
                    match engine.commit(vec![SceneEdit::DeleteNode(node)]).await {
                        Ok(()) => {
                            slot.transform_node = None;
                            slot.transform = None;
                        }
                        Err(e) => log::warn!("slot {idx}: transform removal failed: {e}"),
                    }
                }
                (None, None) => slot.transform = None,
            }
        }

        if touched {
            engine.request_draw();
        }
    }
}
