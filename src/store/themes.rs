//! Recoloring built structures without rebuilding geometry.

use super::ViewerStore;
use crate::engine::{EngineFactory, SceneEngine};
use crate::scene::{Color, ColorAssignment, StructureDescriptor, ThemeInputs};
use crate::util::equality::theme_inputs_equal;

impl<F: EngineFactory> ViewerStore<F> {
    /// Re-theme every built slot whose color assignment or base color
    /// changed since it was last applied.
    pub async fn apply_themes(&mut self, descriptors: &[Option<StructureDescriptor>]) {
        let inputs: Vec<ThemeInputs> = descriptors
            .iter()
            .map(|d| ThemeInputs::of(d.as_ref()))
            .collect();
        self.apply_theme_inputs(&inputs).await;
    }

    /// Apply one color assignment to every slot, with no per-slot base
    /// color. `default_color`, when given, replaces the store default
    /// first.
    pub async fn set_shared_color_assignment(
        &mut self,
        assignment: Option<ColorAssignment>,
        default_color: Option<Color>,
    ) {
        if let Some(color) = default_color {
            self.default_color = color;
        }
        let shared = ThemeInputs {
            assignment,
            base: None,
        };
        let inputs = vec![shared; self.slots.len()];
        self.apply_theme_inputs(&inputs).await;
    }

    async fn apply_theme_inputs(&mut self, inputs: &[ThemeInputs]) {
        let Self {
            engine,
            themes,
            slots,
            default_color,
            ..
        } = self;
        let Some(engine) = engine.as_mut() else {
            return;
        };

        let mut touched = false;
        for (idx, (slot, next)) in slots.iter_mut().zip(inputs).enumerate() {
            if theme_inputs_equal(next, &slot.theme) {
                continue;
            }
            let Some(structure) = slot.structure.as_ref() else {
                continue;
            };
            touched = true;

            let resolved = match themes.resolve(engine, idx, next, *default_color) {
                Ok(resolved) => resolved,
                Err(e) => {
                    log::warn!("slot {idx}: theme not resolved: {e}");
                    continue;
                }
            };
            match engine.update_theme(structure, &resolved.theme).await {
                Ok(()) => slot.theme = next.clone(),
                Err(e) => {
                    resolved.roll_back();
                    log::warn!("slot {idx}: theme update failed: {e}");
                }
            }
        }

        if touched {
            engine.request_draw();
        }
    }
}
