use std::collections::{BTreeMap, BTreeSet};

use crate::allocation::{rebalance, Slot};
use crate::demand::{find_plantable_plants, tally_produce, wanted_by_biome};
use crate::world::biome_of;
use crate::{AutofarmState, Biome, Clock, Constants, Event, EventEnvelope, Season, WorldQuery};

/// Called once per world frame.
///
/// Runs the allocation pipeline when the map is loaded, the game is not
/// paused, the frame counter lands on the update interval, and the engine is
/// enabled. Returns `None` when the run is skipped; nothing is touched then.
pub fn on_update<W: WorldQuery + Clock>(
    state: &mut AutofarmState,
    world: &mut W,
    constants: &Constants,
) -> Option<Vec<EventEnvelope>> {
    if !world.is_world_loaded() || world.is_paused() {
        return None;
    }
    if !world
        .frame_counter()
        .is_multiple_of(constants.update_interval_frames.max(1))
    {
        return None;
    }
    if !state.is_enabled() {
        return None;
    }
    Some(run_once(state, world))
}

/// Rebalances every biome's plots for the current season.
///
/// Order of operations:
/// 1. Find plants with free seeds that would finish growing if sown now.
/// 2. Tally produce on hand for those plants and keep the tally for status.
/// 3. Collect the plants below threshold, grouped by biome.
/// 4. Group existing plots by biome and rebalance each group.
///
/// Biomes with plots but no wanted plants go fallow. Returns one
/// `CropChanged` per changed plot followed by a `RunCompleted` summary.
pub fn run_once<W: WorldQuery + Clock>(
    state: &mut AutofarmState,
    world: &mut W,
) -> Vec<EventEnvelope> {
    let season = world.current_season();
    let frame = world.frame_counter();
    let mut events = Vec::new();

    let plantable = find_plantable_plants(&*world, season, world.season_tick());
    let counts = tally_produce(&*world, &plantable);
    let wanted = wanted_by_biome(&plantable, &counts, state);
    let wanted_total = counts
        .iter()
        .filter(|(plant, on_hand)| state.needs_more(**plant, **on_hand))
        .count();
    state.record_counts(counts);

    let groups = group_plots(&*world, season);
    let plot_total = groups.values().map(Vec::len).sum();
    let none_wanted = BTreeSet::new();
    let mut changed = 0;

    for (biome, mut slots) in groups {
        let wanted_here = wanted.get(&biome).unwrap_or(&none_wanted);
        for change in rebalance(&mut slots, wanted_here) {
            world.set_plot_crop(change.plot, season, change.to);
            changed += 1;
            events.push(crate::emit(
                &mut state.counters,
                frame,
                Event::CropChanged {
                    plot_id: change.plot,
                    biome,
                    season,
                    from: change.from,
                    to: change.to,
                },
            ));
        }
    }

    events.push(crate::emit(
        &mut state.counters,
        frame,
        Event::RunCompleted {
            season,
            plantable: plantable.len(),
            wanted: wanted_total,
            plots: plot_total,
            changed,
        },
    ));
    events
}

/// Existing plots grouped by biome, each group in world order.
fn group_plots(world: &impl WorldQuery, season: Season) -> BTreeMap<Biome, Vec<Slot>> {
    let mut groups: BTreeMap<Biome, Vec<Slot>> = BTreeMap::new();
    for plot in world.farm_plots() {
        if !plot.exists {
            continue;
        }
        groups
            .entry(biome_of(world, plot.pos))
            .or_default()
            .push(Slot {
                plot: plot.id,
                crop: plot.crop(season),
            });
    }
    groups
}
