//! Highlight labels and region overpaint.

use super::slot::SlotState;
use super::ViewerStore;
use crate::engine::{EngineFactory, LabelParams, SceneEdit, SceneEngine};
use crate::error::SyncError;
use crate::options::LabelOptions;
use crate::scene::{Color, Highlight, StructureDescriptor, ThemeInputs};
use crate::theme::ThemeResolver;
use crate::util::equality::highlights_equal;

impl<F: EngineFactory> ViewerStore<F> {
    /// Bring every slot's labels and overpaint in line with its highlight
    /// list.
    ///
    /// Slots whose list equals the last applied one are skipped. When the
    /// number of visible highlights matches the existing labels, labels are
    /// edited in place; otherwise they are recreated. Overpaint follows list
    /// order, so later highlights win where ranges overlap. A failure leaves
    /// the slot's recorded highlights unchanged and moves on.
    pub async fn apply_highlights(&mut self, descriptors: &[Option<StructureDescriptor>]) {
        let Self {
            engine,
            themes,
            slots,
            options,
            default_color,
            ..
        } = self;
        let Some(engine) = engine.as_mut() else {
            return;
        };

        let mut touched = false;
        for (idx, (slot, descriptor)) in slots.iter_mut().zip(descriptors).enumerate() {
            let next = descriptor.as_ref().and_then(|d| d.highlights.as_deref());
            if highlights_equal(next, slot.highlights.as_deref()) {
                continue;
            }
            if slot.structure.is_none() {
                continue;
            }
            if let Err(e) = validate(next.unwrap_or_default()) {
                log::warn!("slot {idx}: highlights not applied: {e}");
                continue;
            }
            touched = true;

            let inputs = ThemeInputs::of(descriptor.as_ref());
            let outcome = apply_slot_highlights(
                engine,
                themes,
                &options.labels,
                *default_color,
                idx,
                slot,
                &inputs,
                next.unwrap_or_default(),
            )
            .await;
            match outcome {
                Ok(()) => slot.highlights = next.map(<[Highlight]>::to_vec),
                Err(e) => log::warn!("slot {idx}: highlights not applied: {e}"),
            }
        }

        if touched {
            engine.request_draw();
        }
    }
}

fn validate(highlights: &[Highlight]) -> Result<(), SyncError> {
    highlights
        .iter()
        .filter(|h| h.is_visible())
        .try_for_each(Highlight::validate)
}

fn label_params(highlight: &Highlight, defaults: &LabelOptions) -> LabelParams {
    LabelParams {
        text: highlight.label.text.clone(),
        color: highlight.label.color,
        scale: highlight.label.scale.unwrap_or(defaults.default_scale),
    }
}

#[allow(clippy::too_many_arguments)]
async fn apply_slot_highlights<E: SceneEngine>(
    engine: &mut E,
    themes: &mut ThemeResolver,
    labels: &LabelOptions,
    default_color: Color,
    idx: usize,
    slot: &mut SlotState<E>,
    inputs: &ThemeInputs,
    highlights: &[Highlight],
) -> Result<(), SyncError> {
    let visible: Vec<&Highlight> = highlights.iter().filter(|h| h.is_visible()).collect();
    let Some(structure) = slot.structure.clone() else {
        return Ok(());
    };

    engine.clear_overpaint(&structure).await?;
    let resolved = themes.resolve(engine, idx, inputs, default_color)?;
    if let Err(e) = engine.update_theme(&structure, &resolved.theme).await {
        resolved.roll_back();
        return Err(e.into());
    }
    slot.theme = inputs.clone();

    if !slot.labels.is_empty() && slot.labels.len() == visible.len() {
        let edits = slot
            .labels
            .iter()
            .zip(&visible)
            .map(|(label, h)| SceneEdit::UpdateLabel {
                label: label.clone(),
                params: label_params(h, labels),
            })
            .collect();
        engine.commit(edits).await?;
    } else {
        if !slot.labels.is_empty() {
            let edits = slot
                .labels
                .iter()
                .cloned()
                .map(SceneEdit::DeleteLabel)
                .collect();
            engine.commit(edits).await?;
            slot.labels.clear();
        }
        for highlight in &visible {
            let range = highlight.range_start..=highlight.range_end;
            let loci = engine.select_residues(&structure, range)?;
            let params = label_params(highlight, labels);
            let label = engine.add_label(&loci, &params).await?;
            slot.labels.push(label);
        }
    }

    for highlight in &visible {
        let range = highlight.range_start..=highlight.range_end;
        let loci = engine.select_residues(&structure, range)?;
        engine
            .set_overpaint(&structure, &loci, highlight.label.color)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::recording::{EngineOp, LabelId, StructureId};
    use crate::scene::ColorAssignment;
    use crate::store::test_support::{pdb, ready_store, TestFactory};

    const RED: Color = Color::from_rgb(255, 0, 0);
    const BLUE: Color = Color::from_rgb(0, 0, 255);

    fn cycle(store: &mut ViewerStore<TestFactory>, d: &[Option<StructureDescriptor>]) {
        let _ = pollster::block_on(store.ensure_structures(d, None));
        pollster::block_on(store.apply_highlights(d));
    }

    fn with_highlights(highlights: Vec<Highlight>) -> Vec<Option<StructureDescriptor>> {
        vec![Some(pdb("a").with_highlights(highlights))]
    }

    fn single(highlight: Highlight) -> Vec<Option<StructureDescriptor>> {
        with_highlights(vec![highlight])
    }

    fn label_ids(store: &ViewerStore<TestFactory>) -> Vec<LabelId> {
        store.labels(0).to_vec()
    }

    #[test]
    fn creates_labels_and_overpaint_in_list_order() {
        let (mut store, log) = ready_store();
        let d = with_highlights(vec![
            Highlight::new(1, 10, "site", RED),
            Highlight::new(5, 8, "loop", BLUE).with_scale(2.0),
        ]);
        cycle(&mut store, &d);

        let engine = store.engine().unwrap();
        let labels = engine.labels();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].1.params.scale, 2.0);
        assert_eq!(labels[0].1.params.scale, 1.0);

        let (id, structure) = engine.structures()[0];
        assert_eq!(id, *store.structure(0).unwrap());
        assert_eq!(structure.overpaint, vec![(1..=10, RED), (5..=8, BLUE)]);
        assert!(log.count(|op| *op == EngineOp::RequestDraw) >= 1);
    }

    #[test]
    fn equal_highlights_are_skipped() {
        let (mut store, log) = ready_store();
        let d = single(Highlight::new(1, 3, "x", RED));
        cycle(&mut store, &d);
        let _ = log.take();

        cycle(&mut store, &d.clone());
        assert!(log.is_empty());
    }

    #[test]
    fn same_count_updates_labels_in_place() {
        let (mut store, log) = ready_store();
        cycle(&mut store, &single(Highlight::new(1, 3, "a", RED)));
        let before = label_ids(&store);
        let _ = log.take();

        cycle(&mut store, &single(Highlight::new(1, 3, "ab", RED)));
        assert_eq!(label_ids(&store), before);
        assert_eq!(log.count(|op| matches!(op, EngineOp::AddLabel { .. })), 0);
        let updated = log.count(|op| match op {
            EngineOp::Commit(edits) => matches!(
                edits.as_slice(),
                [SceneEdit::UpdateLabel { params, .. }] if params.text == "ab"
            ),
            _ => false,
        });
        assert_eq!(updated, 1);
        let (_, label) = store.engine().unwrap().labels()[0];
        assert_eq!(label.params.text, "ab");
    }

    #[test]
    fn count_change_recreates_labels() {
        let (mut store, log) = ready_store();
        cycle(&mut store, &single(Highlight::new(1, 3, "a", RED)));
        let before = label_ids(&store);
        let _ = log.take();

        cycle(
            &mut store,
            &with_highlights(vec![
                Highlight::new(1, 3, "a", RED),
                Highlight::new(7, 9, "b", BLUE),
            ]),
        );
        let after = label_ids(&store);
        assert_eq!(after.len(), 2);
        assert!(!after.contains(&before[0]));
        assert_eq!(log.count(|op| matches!(op, EngineOp::AddLabel { .. })), 2);
        assert_eq!(store.engine().unwrap().labels().len(), 2);
    }

    #[test]
    fn hidden_highlights_draw_nothing_but_count_as_change() {
        let (mut store, log) = ready_store();
        cycle(&mut store, &single(Highlight::new(1, 3, "a", RED)));
        let _ = log.take();

        cycle(&mut store, &single(Highlight::new(1, 3, "a", RED).hidden()));
        let engine = store.engine().unwrap();
        assert!(engine.labels().is_empty());
        assert!(engine.structures()[0].1.overpaint.is_empty());
        assert_eq!(log.count(|op| matches!(op, EngineOp::ClearOverpaint(_))), 1);
    }

    #[test]
    fn clearing_highlights_resets_theme_and_labels() {
        let (mut store, log) = ready_store();
        cycle(&mut store, &single(Highlight::new(1, 3, "a", RED)));
        let _ = log.take();

        cycle(&mut store, &[Some(pdb("a"))]);
        let id: StructureId = *store.structure(0).unwrap();
        let is_update = |op: &EngineOp| matches!(op, EngineOp::UpdateTheme { .. });
        let ops = log.take();
        assert!(ops.contains(&EngineOp::ClearOverpaint(id)));
        assert!(ops.iter().any(is_update));
        assert!(store.labels(0).is_empty());
        assert!(store.engine().unwrap().labels().is_empty());
    }

    #[test]
    fn inverted_range_keeps_previous_state() {
        let (mut store, log) = ready_store();
        cycle(&mut store, &single(Highlight::new(1, 3, "a", RED)));
        let _ = log.take();

        cycle(&mut store, &single(Highlight::new(9, 2, "bad", RED)));
        assert_eq!(log.count(EngineOp::is_mutation), 0);
        assert_eq!(store.engine().unwrap().labels()[0].1.params.text, "a");
    }

    #[test]
    fn selection_failure_is_retried_next_cycle() {
        let (mut store, _log) = ready_store();
        store.engine_mut().unwrap().failures_mut().selection = true;
        let d = single(Highlight::new(1, 3, "a", RED));
        cycle(&mut store, &d);
        assert!(store.engine().unwrap().labels().is_empty());

        store.engine_mut().unwrap().failures_mut().selection = false;
        cycle(&mut store, &d);
        assert_eq!(store.engine().unwrap().labels().len(), 1);
    }

    #[test]
    fn theme_failure_keeps_provider_colors() {
        let (mut store, _log) = ready_store();
        let colors = |c: Color| -> ColorAssignment { [(2, c)].into() };
        let first = pdb("a").with_color_assignment(colors(RED));
        cycle(&mut store, &[Some(first)]);

        store.engine_mut().unwrap().failures_mut().theme_update = true;
        let next = pdb("a")
            .with_color_assignment(colors(BLUE))
            .with_highlights(vec![Highlight::new(1, 3, "a", RED)]);
        cycle(&mut store, &[Some(next)]);

        let names = store.theme_names();
        let provider = store.engine().unwrap().theme(&names[0]).unwrap();
        assert_eq!(provider.color_at(2), RED);
        assert!(store.labels(0).is_empty());
    }
}
