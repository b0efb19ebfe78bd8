use super::*;
use crate::test_fixtures::{
    base_state, growth, harvested, plot, seeds, slots, wanted, CAVE_WHEAT, PIG_TAIL,
    PLUMP_HELMET, STRAWBERRY, SURFACE_Z,
};
use std::collections::BTreeMap;

mod allocation;
mod demand;
mod eligibility;

// --- Shared test helpers ------------------------------------------------

const CAVERN_Z: i32 = SURFACE_Z - 10;

fn crop_counts(slots: &[Slot]) -> BTreeMap<Option<PlantId>, usize> {
    let mut counts = BTreeMap::new();
    for slot in slots {
        *counts.entry(slot.crop).or_insert(0) += 1;
    }
    counts
}

/// Enabled engine state with default thresholds.
fn enabled_state() -> AutofarmState {
    let mut state = AutofarmState::new(&Constants::default());
    state.set_enabled(true);
    state
}

/// Fortress with `count` fallow cavern plots and five seeds each of plump
/// helmets and pig tails.
fn cavern_fortress(count: u32) -> FortressState {
    let mut world = base_state();
    world.plots = (0..count).map(|id| plot(id, None, CAVERN_Z)).collect();
    world.items = vec![seeds(100, PLUMP_HELMET, 5), seeds(101, PIG_TAIL, 5)];
    world
}

fn crop_changes(events: &[EventEnvelope]) -> Vec<(PlotId, Option<PlantId>, Option<PlantId>)> {
    events
        .iter()
        .filter_map(|envelope| match &envelope.event {
            Event::CropChanged {
                plot_id, from, to, ..
            } => Some((*plot_id, *from, *to)),
            Event::RunCompleted { .. } => None,
        })
        .collect()
}
