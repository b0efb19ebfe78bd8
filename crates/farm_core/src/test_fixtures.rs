//! Shared test fixtures for `farm_core` and downstream crates.
//!
//! `base_state()` provides a loaded, unpaused fortress with a small plant list
//! and no items or plots; tests add what they need. `random_slots()` and
//! `random_wanted()` drive the seeded property tests.

use std::collections::BTreeSet;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    Biome, FarmPlot, FortressState, ItemId, ItemRecord, MetaState, PlantCode, PlantDef, PlantFlag,
    PlantId, PlotId, Position, ProduceItem, Season, Slot,
};

pub const PLUMP_HELMET: PlantId = PlantId(0);
pub const PIG_TAIL: PlantId = PlantId(1);
pub const CAVE_WHEAT: PlantId = PlantId(2);
pub const STRAWBERRY: PlantId = PlantId(3);
pub const APPLE: PlantId = PlantId(4);
pub const ROPE_REED: PlantId = PlantId(5);

pub const SURFACE_Z: i32 = 100;

/// Builds a plant raw growing in `seasons` with the extra `flags`.
pub fn plant_def(
    index: u32,
    code: &str,
    seasons: &[Season],
    grow_duration: u32,
    flags: &[PlantFlag],
) -> PlantDef {
    PlantDef {
        id: PlantId(index),
        code: PlantCode(code.to_string()),
        name: code.to_lowercase().replace('_', " "),
        grow_duration,
        flags: seasons
            .iter()
            .map(|season| season.flag())
            .chain(flags.iter().copied())
            .collect(),
    }
}

/// Three cavern crops, a two-season surface berry, a tree, and a seedless reed.
pub fn base_plants() -> Vec<PlantDef> {
    let cavern = [PlantFlag::Seed, PlantFlag::BiomeSubterraneanWater];
    vec![
        plant_def(0, "MUSHROOM_HELMET_PLUMP", &Season::ALL, 100, &cavern),
        plant_def(1, "GRASS_TAIL_PIG", &Season::ALL, 100, &cavern),
        plant_def(2, "GRASS_WHEAT_CAVE", &Season::ALL, 100, &cavern),
        plant_def(
            3,
            "BERRIES_STRAW_WILD",
            &[Season::Spring, Season::Summer],
            100,
            &[PlantFlag::Seed, PlantFlag::BiomeGrasslandTemperate],
        ),
        plant_def(
            4,
            "APPLE",
            &Season::ALL,
            100,
            &[
                PlantFlag::Seed,
                PlantFlag::Tree,
                PlantFlag::BiomeGrasslandTemperate,
            ],
        ),
        plant_def(
            5,
            "REED_ROPE",
            &Season::ALL,
            100,
            &[PlantFlag::BiomeGrasslandTemperate],
        ),
    ]
}

/// Loaded, unpaused fortress at frame 0, first tick of spring.
pub fn base_state() -> FortressState {
    FortressState {
        meta: MetaState {
            frame_counter: 0,
            year: 1,
            season: Season::Spring,
            season_tick: 0,
            paused: false,
            map_loaded: true,
            seed: 42,
            content_version: "test".to_string(),
        },
        plants: base_plants(),
        items: vec![],
        plots: vec![],
        regions: vec![],
        default_biome: Biome::GrasslandTemperate,
        surface_z: SURFACE_Z,
    }
}

/// An existing plot growing `crop` in every season.
pub fn plot(id: u32, crop: Option<u32>, z: i32) -> FarmPlot {
    FarmPlot {
        id: PlotId(id),
        pos: Position {
            x: id as i32,
            y: 0,
            z,
        },
        exists: true,
        crops: [crop.map(PlantId); 4],
    }
}

fn produce_item(id: u32, plant: PlantId, stack_size: u32) -> ProduceItem {
    ProduceItem {
        id: ItemId(id),
        plant,
        stack_size,
        flags: smallvec::smallvec![],
    }
}

pub fn seeds(id: u32, plant: PlantId, stack_size: u32) -> ItemRecord {
    ItemRecord::Seeds(produce_item(id, plant, stack_size))
}

pub fn harvested(id: u32, plant: PlantId, stack_size: u32) -> ItemRecord {
    ItemRecord::Plant(produce_item(id, plant, stack_size))
}

pub fn growth(id: u32, plant: PlantId, stack_size: u32) -> ItemRecord {
    ItemRecord::PlantGrowth(produce_item(id, plant, stack_size))
}

pub fn slots(crops: &[Option<u32>]) -> Vec<Slot> {
    crops
        .iter()
        .enumerate()
        .map(|(idx, crop)| Slot {
            plot: PlotId(idx as u32),
            crop: crop.map(PlantId),
        })
        .collect()
}

pub fn wanted(ids: &[u32]) -> BTreeSet<PlantId> {
    ids.iter().copied().map(PlantId).collect()
}

/// Up to `max_slots` plots, each fallow or planted with one of `plant_pool` plants.
pub fn random_slots(rng: &mut impl Rng, max_slots: usize, plant_pool: u32) -> Vec<Slot> {
    let count = rng.gen_range(0..=max_slots);
    (0..count)
        .map(|idx| Slot {
            plot: PlotId(idx as u32),
            crop: rng
                .gen_bool(0.85)
                .then(|| PlantId(rng.gen_range(0..plant_pool))),
        })
        .collect()
}

/// A random subset of `0..plant_pool`.
pub fn random_wanted(rng: &mut impl Rng, plant_pool: u32) -> BTreeSet<PlantId> {
    (0..plant_pool)
        .filter(|_| rng.gen_bool(0.5))
        .map(PlantId)
        .collect()
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
