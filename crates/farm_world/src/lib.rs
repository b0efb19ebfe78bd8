//! Content loading, world generation, and the fortress clock, shared between
//! farm_cli and farm_daemon.

use anyhow::{Context, Result};
use farm_core::{
    AutofarmState, Biome, BiomeRegion, Constants, FarmContent, FarmPlot, FortressState, ItemFlag,
    ItemId, ItemRecord, MetaState, PlantDef, PlantFlag, PlantId, PlotId, Position, ProduceItem,
    Season, BIOME_FLAGS, SEASON_LENGTH,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Frames per season tick; a season lasts `SEASON_LENGTH * FRAMES_PER_SEASON_TICK` frames.
pub const FRAMES_PER_SEASON_TICK: u64 = 10;

const SURFACE_Z: i32 = 150;
const CAVERN_Z: i32 = 130;
const MAP_WIDTH: i32 = 96;
const SURFACE_PLOTS: u32 = 4;
const CAVERN_PLOTS: u32 = 6;

#[derive(Deserialize)]
struct PlantsFile {
    content_version: String,
    plants: Vec<PlantDef>,
}

/// Validates loaded plant raws, panicking on any authoring error.
///
/// Catches mistakes like: a plant whose id does not match its position in the
/// raw list, duplicate or lower-case codes, or an update interval of zero.
pub fn validate_content(content: &FarmContent) {
    let mut codes: HashSet<&str> = HashSet::new();
    for (index, plant) in content.plants.iter().enumerate() {
        assert_eq!(
            plant.id.0 as usize, index,
            "plant '{}' has id {} but sits at raw index {index}",
            plant.code, plant.id,
        );
        assert!(!plant.code.0.is_empty(), "plant at index {index} has an empty code");
        assert_eq!(
            plant.code.0,
            plant.code.0.to_uppercase(),
            "plant code '{}' must be upper-case",
            plant.code,
        );
        assert!(
            codes.insert(plant.code.0.as_str()),
            "plant code '{}' is used more than once",
            plant.code,
        );
    }
    assert!(
        content.constants.update_interval_frames > 0,
        "update_interval_frames must be positive",
    );
}

pub fn load_content(content_dir: &str) -> Result<FarmContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;
    let plants_file: PlantsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("plants.json")).context("reading plants.json")?,
    )
    .context("parsing plants.json")?;
    let content = FarmContent {
        content_version: plants_file.content_version,
        plants: plants_file.plants,
        constants,
    };
    validate_content(&content);
    Ok(content)
}

pub fn load_state(path: &Path) -> Result<FortressState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("parsing state file: {}", path.display()))
}

pub fn save_state(state: &FortressState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("serializing fortress state")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing state file: {}", path.display()))
}

/// Where the allocator's settings for the fortress at `fortress_path` live:
/// `fortress.json` pairs with `fortress.autofarm.json`.
pub fn engine_state_path(fortress_path: &Path) -> PathBuf {
    fortress_path.with_extension("autofarm.json")
}

/// Loads saved allocator settings; `None` when nothing was saved yet.
pub fn load_engine_state(path: &Path) -> Result<Option<AutofarmState>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading engine state: {}", path.display()))?;
    let state = serde_json::from_str(&json)
        .with_context(|| format!("parsing engine state: {}", path.display()))?;
    Ok(Some(state))
}

pub fn save_engine_state(state: &AutofarmState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("serializing engine state")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing engine state: {}", path.display()))
}

/// Advances the fortress clock by one frame. Paused fortresses do not move.
///
/// Every `FRAMES_PER_SEASON_TICK` frames the season tick advances; after
/// `SEASON_LENGTH` season ticks the next season starts, and a new year
/// starts with spring.
pub fn advance_frame(state: &mut FortressState) {
    let meta = &mut state.meta;
    if meta.paused {
        return;
    }
    meta.frame_counter += 1;
    if !meta.frame_counter.is_multiple_of(FRAMES_PER_SEASON_TICK) {
        return;
    }
    meta.season_tick += 1;
    if meta.season_tick >= SEASON_LENGTH {
        meta.season_tick = 0;
        meta.season = meta.season.next();
        if meta.season == Season::Spring {
            meta.year += 1;
        }
    }
}

/// Surface biomes some plant in `content` can be farmed in.
fn farmable_surface_biomes(content: &FarmContent) -> Vec<Biome> {
    let underground = [
        Biome::SubterraneanWater,
        Biome::SubterraneanChasm,
        Biome::SubterraneanLava,
    ];
    BIOME_FLAGS
        .iter()
        .filter(|(flag, biome)| {
            !underground.contains(biome) && content.plants.iter().any(|p| p.has(*flag))
        })
        .map(|(_, biome)| *biome)
        .collect()
}

/// A stack with a one-in-ten chance of being forbidden.
fn stack(index: usize, plant: PlantId, stack_size: u32, rng: &mut impl Rng) -> ProduceItem {
    let mut item = ProduceItem {
        id: ItemId(index as u32 + 1),
        plant,
        stack_size,
        flags: Default::default(),
    };
    if rng.gen_bool(0.1) {
        item.flags.push(ItemFlag::Forbid);
    }
    item
}

/// Builds a fresh fortress: two surface regions, fallow plots on the surface
/// and in the caverns, and random seed and produce stockpiles.
pub fn build_initial_state(content: &FarmContent, seed: u64, rng: &mut impl Rng) -> FortressState {
    let mut surface = farmable_surface_biomes(content);
    surface.shuffle(rng);
    let west = surface.first().copied().unwrap_or(Biome::GrasslandTemperate);
    let east = surface.get(1).copied().unwrap_or(west);
    let half = MAP_WIDTH / 2;
    let regions = vec![
        BiomeRegion {
            x_min: 0,
            x_max: half - 1,
            y_min: 0,
            y_max: MAP_WIDTH - 1,
            biome: west,
        },
        BiomeRegion {
            x_min: half,
            x_max: MAP_WIDTH - 1,
            y_min: 0,
            y_max: MAP_WIDTH - 1,
            biome: east,
        },
    ];

    let mut plots = Vec::new();
    for idx in 0..SURFACE_PLOTS + CAVERN_PLOTS {
        let z = if idx < SURFACE_PLOTS { SURFACE_Z } else { CAVERN_Z };
        plots.push(FarmPlot {
            id: PlotId(idx + 1),
            pos: Position {
                x: rng.gen_range(0..MAP_WIDTH),
                y: rng.gen_range(0..MAP_WIDTH),
                z,
            },
            exists: true,
            crops: [None; 4],
        });
    }

    let mut items = Vec::new();
    for plant in content.plants.iter().filter(|p| p.has(PlantFlag::Seed)) {
        let seeds = rng.gen_range(1..=20);
        items.push(ItemRecord::Seeds(stack(items.len(), plant.id, seeds, rng)));
        let harvested = rng.gen_range(0..=60);
        items.push(ItemRecord::Plant(stack(items.len(), plant.id, harvested, rng)));
        if rng.gen_bool(0.5) {
            let picked = rng.gen_range(1..=30);
            items.push(ItemRecord::PlantGrowth(stack(items.len(), plant.id, picked, rng)));
        }
    }

    FortressState {
        meta: MetaState {
            frame_counter: 0,
            year: 1,
            season: Season::Spring,
            season_tick: 0,
            paused: false,
            map_loaded: true,
            seed,
            content_version: content.content_version.clone(),
        },
        plants: content.plants.clone(),
        items,
        plots,
        regions,
        default_biome: west,
        surface_z: SURFACE_Z,
    }
}
