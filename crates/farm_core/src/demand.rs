//! Seed availability, produce stock tallies, and per-biome demand.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;

use crate::biomes::biomes_for;
use crate::eligibility::is_plantable;
use crate::{AutofarmState, Biome, BiomeSet, ItemClass, PlantId, Season, WorldQuery};

/// Plants that can be sown this season, with the biomes each may go in.
pub type PlantableMap = BTreeMap<PlantId, BiomeSet>;

/// Sums available seed stacks per plant.
pub fn count_seeds(world: &impl WorldQuery) -> AHashMap<PlantId, u32> {
    let mut counts: AHashMap<PlantId, u32> = AHashMap::new();
    for record in world.items(ItemClass::Seeds) {
        let Some(seeds) = record.as_seeds() else {
            continue;
        };
        if seeds.is_available() {
            let count = counts.entry(seeds.plant).or_insert(0);
            *count = count.saturating_add(seeds.stack_size);
        }
    }
    counts
}

/// Plants with free seeds on hand that would finish growing if sown now.
///
/// Seeds of plants with no raw definition are ignored.
pub fn find_plantable_plants(
    world: &impl WorldQuery,
    season: Season,
    season_tick: u64,
) -> PlantableMap {
    count_seeds(world)
        .into_iter()
        .filter(|(_, seeds)| *seeds > 0)
        .filter_map(|(id, _)| world.plant(id))
        .filter(|plant| is_plantable(plant, season, season_tick))
        .map(|plant| (plant.id, biomes_for(plant)))
        .collect()
}

/// Stock of harvested plants and growths per plantable plant.
///
/// Every plantable plant gets an entry, zero when nothing is on hand; produce
/// of other plants is not counted.
pub fn tally_produce(world: &impl WorldQuery, plantable: &PlantableMap) -> BTreeMap<PlantId, u32> {
    let mut counts: BTreeMap<PlantId, u32> = plantable.keys().map(|id| (*id, 0)).collect();
    let produce = world
        .items(ItemClass::Plant)
        .chain(world.items(ItemClass::PlantGrowth));
    for record in produce {
        let item = record.produce();
        if !item.is_available() {
            continue;
        }
        if let Some(count) = counts.get_mut(&item.plant) {
            *count = count.saturating_add(item.stack_size);
        }
    }
    counts
}

/// Groups plants still below their threshold by the biomes they may be farmed in.
pub fn wanted_by_biome(
    plantable: &PlantableMap,
    counts: &BTreeMap<PlantId, u32>,
    state: &AutofarmState,
) -> BTreeMap<Biome, BTreeSet<PlantId>> {
    let mut wanted: BTreeMap<Biome, BTreeSet<PlantId>> = BTreeMap::new();
    for (plant, biomes) in plantable {
        let on_hand = counts.get(plant).copied().unwrap_or(0);
        if !state.needs_more(*plant, on_hand) {
            continue;
        }
        for biome in biomes {
            wanted.entry(*biome).or_default().insert(*plant);
        }
    }
    wanted
}
