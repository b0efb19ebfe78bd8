//! Type definitions for `farm_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the allocation engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Season ticks in one season. `season_tick` runs `0..SEASON_LENGTH`.
pub const SEASON_LENGTH: u64 = 10_080;
/// Grow durations are stored in units of ten season ticks.
pub const GROW_DURATION_SCALE: u64 = 10;
pub const SEASONS_PER_YEAR: usize = 4;
pub const DEFAULT_THRESHOLD: u32 = 50;
/// The engine is considered once every this many frames (about one in-game hour).
pub const UPDATE_INTERVAL_FRAMES: u64 = 50;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

macro_rules! index_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(PlantCode);
string_id!(EventId);
index_id!(PlantId);
index_id!(PlotId);
index_id!(ItemId);

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; SEASONS_PER_YEAR] =
        [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Season {
        Self::ALL[index % SEASONS_PER_YEAR]
    }

    /// The season after this one; winter wraps to spring.
    pub fn next(self) -> Season {
        Self::from_index(self.index() + 1)
    }

    /// The plant flag marking a plant as growable during this season.
    pub fn flag(self) -> PlantFlag {
        match self {
            Season::Spring => PlantFlag::Spring,
            Season::Summer => PlantFlag::Summer,
            Season::Autumn => PlantFlag::Autumn,
            Season::Winter => PlantFlag::Winter,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Biomes and plant flags
// ---------------------------------------------------------------------------

/// Declares `Biome`, `PlantFlag`, and the static table pairing every
/// `BIOME_*` plant flag with the biome it unlocks.
macro_rules! biome_kinds {
    ($($biome:ident => $flag:ident),* $(,)?) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum Biome {
            $($biome),*
        }

        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum PlantFlag {
            Seed,
            Tree,
            Spring,
            Summer,
            Autumn,
            Winter,
            $($flag),*
        }

        pub const BIOME_FLAGS: &[(PlantFlag, Biome)] = &[$((PlantFlag::$flag, Biome::$biome)),*];
    };
}

biome_kinds! {
    Mountain => BiomeMountain,
    Glacier => BiomeGlacier,
    Tundra => BiomeTundra,
    SwampTemperateFreshwater => BiomeSwampTemperateFreshwater,
    SwampTemperateSaltwater => BiomeSwampTemperateSaltwater,
    MarshTemperateFreshwater => BiomeMarshTemperateFreshwater,
    MarshTemperateSaltwater => BiomeMarshTemperateSaltwater,
    SwampTropicalFreshwater => BiomeSwampTropicalFreshwater,
    SwampTropicalSaltwater => BiomeSwampTropicalSaltwater,
    SwampMangrove => BiomeSwampMangrove,
    MarshTropicalFreshwater => BiomeMarshTropicalFreshwater,
    MarshTropicalSaltwater => BiomeMarshTropicalSaltwater,
    ForestTaiga => BiomeForestTaiga,
    ForestTemperateConifer => BiomeForestTemperateConifer,
    ForestTemperateBroadleaf => BiomeForestTemperateBroadleaf,
    ForestTropicalConifer => BiomeForestTropicalConifer,
    ForestTropicalDryBroadleaf => BiomeForestTropicalDryBroadleaf,
    ForestTropicalMoistBroadleaf => BiomeForestTropicalMoistBroadleaf,
    GrasslandTemperate => BiomeGrasslandTemperate,
    SavannaTemperate => BiomeSavannaTemperate,
    ShrublandTemperate => BiomeShrublandTemperate,
    GrasslandTropical => BiomeGrasslandTropical,
    SavannaTropical => BiomeSavannaTropical,
    ShrublandTropical => BiomeShrublandTropical,
    DesertBadland => BiomeDesertBadland,
    DesertRock => BiomeDesertRock,
    DesertSand => BiomeDesertSand,
    OceanTropical => BiomeOceanTropical,
    OceanTemperate => BiomeOceanTemperate,
    OceanArctic => BiomeOceanArctic,
    PoolTemperateFreshwater => BiomePoolTemperateFreshwater,
    PoolTemperateBrackishwater => BiomePoolTemperateBrackishwater,
    PoolTemperateSaltwater => BiomePoolTemperateSaltwater,
    PoolTropicalFreshwater => BiomePoolTropicalFreshwater,
    PoolTropicalBrackishwater => BiomePoolTropicalBrackishwater,
    PoolTropicalSaltwater => BiomePoolTropicalSaltwater,
    LakeTemperateFreshwater => BiomeLakeTemperateFreshwater,
    LakeTemperateBrackishwater => BiomeLakeTemperateBrackishwater,
    LakeTemperateSaltwater => BiomeLakeTemperateSaltwater,
    LakeTropicalFreshwater => BiomeLakeTropicalFreshwater,
    LakeTropicalBrackishwater => BiomeLakeTropicalBrackishwater,
    LakeTropicalSaltwater => BiomeLakeTropicalSaltwater,
    RiverTemperateFreshwater => BiomeRiverTemperateFreshwater,
    RiverTemperateBrackishwater => BiomeRiverTemperateBrackishwater,
    RiverTemperateSaltwater => BiomeRiverTemperateSaltwater,
    RiverTropicalFreshwater => BiomeRiverTropicalFreshwater,
    RiverTropicalBrackishwater => BiomeRiverTropicalBrackishwater,
    RiverTropicalSaltwater => BiomeRiverTropicalSaltwater,
    SubterraneanWater => BiomeSubterraneanWater,
    SubterraneanChasm => BiomeSubterraneanChasm,
    SubterraneanLava => BiomeSubterraneanLava,
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Biomes a plant may be farmed in. Most plants list a handful.
pub type BiomeSet = SmallVec<[Biome; 8]>;

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

/// Plant raw definition. Reference data; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantDef {
    /// Index into the world's plant raws.
    pub id: PlantId,
    pub code: PlantCode,
    pub name: String,
    /// Growth time in units of ten season ticks.
    pub grow_duration: u32,
    #[serde(default)]
    pub flags: BTreeSet<PlantFlag>,
}

impl PlantDef {
    pub fn has(&self, flag: PlantFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn grows_in(&self, season: Season) -> bool {
        self.has(season.flag())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    #[serde(default = "default_threshold")]
    pub default_threshold: u32,
    #[serde(default = "default_update_interval")]
    pub update_interval_frames: u64,
}

fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD
}

fn default_update_interval() -> u64 {
    UPDATE_INTERVAL_FRAMES
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            update_interval_frames: UPDATE_INTERVAL_FRAMES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmContent {
    pub content_version: String,
    pub plants: Vec<PlantDef>,
    pub constants: Constants,
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemFlag {
    Dump,
    Forbid,
    GarbageCollect,
    Hostile,
    OnFire,
    Rotten,
    Trader,
    InBuilding,
    Construction,
    Artifact,
    OnGround,
    InJob,
    InInventory,
}

/// Flags that make an item unavailable to the fortress.
pub const DISQUALIFYING_ITEM_FLAGS: [ItemFlag; 10] = [
    ItemFlag::Dump,
    ItemFlag::Forbid,
    ItemFlag::GarbageCollect,
    ItemFlag::Hostile,
    ItemFlag::OnFire,
    ItemFlag::Rotten,
    ItemFlag::Trader,
    ItemFlag::InBuilding,
    ItemFlag::Construction,
    ItemFlag::Artifact,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    Seeds,
    /// Harvested whole plants.
    Plant,
    /// Fruit, leaves and other growths picked from plants.
    PlantGrowth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProduceItem {
    pub id: ItemId,
    /// Material index; for seeds and produce this is the plant raw index.
    pub plant: PlantId,
    pub stack_size: u32,
    #[serde(default)]
    pub flags: SmallVec<[ItemFlag; 2]>,
}

impl ProduceItem {
    /// False if any disqualifying flag is set.
    pub fn is_available(&self) -> bool {
        !self
            .flags
            .iter()
            .any(|flag| DISQUALIFYING_ITEM_FLAGS.contains(flag))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemRecord {
    Seeds(ProduceItem),
    Plant(ProduceItem),
    PlantGrowth(ProduceItem),
}

impl ItemRecord {
    pub fn class(&self) -> ItemClass {
        match self {
            ItemRecord::Seeds(_) => ItemClass::Seeds,
            ItemRecord::Plant(_) => ItemClass::Plant,
            ItemRecord::PlantGrowth(_) => ItemClass::PlantGrowth,
        }
    }

    pub fn produce(&self) -> &ProduceItem {
        match self {
            ItemRecord::Seeds(item) | ItemRecord::Plant(item) | ItemRecord::PlantGrowth(item) => {
                item
            }
        }
    }

    pub fn as_seeds(&self) -> Option<&ProduceItem> {
        match self {
            ItemRecord::Seeds(item) => Some(item),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// World state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPlot {
    pub id: PlotId,
    /// Center tile of the plot.
    pub pos: Position,
    pub exists: bool,
    /// Crop per season; `None` leaves the plot fallow for that season.
    pub crops: [Option<PlantId>; SEASONS_PER_YEAR],
}

impl FarmPlot {
    pub fn crop(&self, season: Season) -> Option<PlantId> {
        self.crops[season.index()]
    }
}

/// Rectangular map region sharing one surface biome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeRegion {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
    pub biome: Biome,
}

impl BiomeRegion {
    pub fn contains(&self, pos: Position) -> bool {
        (self.x_min..=self.x_max).contains(&pos.x) && (self.y_min..=self.y_max).contains(&pos.y)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub frame_counter: u64,
    pub year: u32,
    pub season: Season,
    pub season_tick: u64,
    pub paused: bool,
    /// False until a map is loaded.
    pub map_loaded: bool,
    pub seed: u64,
    pub content_version: String,
}

/// In-memory fortress snapshot: the world the engine reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FortressState {
    pub meta: MetaState,
    pub plants: Vec<PlantDef>,
    pub items: Vec<ItemRecord>,
    pub plots: Vec<FarmPlot>,
    pub regions: Vec<BiomeRegion>,
    /// Biome for tiles outside every region.
    pub default_biome: Biome,
    /// Tiles below this z-level are underground.
    pub surface_z: i32,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub frame: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    CropChanged {
        plot_id: PlotId,
        biome: Biome,
        season: Season,
        from: Option<PlantId>,
        to: Option<PlantId>,
    },
    RunCompleted {
        season: Season,
        /// Plants with free seeds that can finish growing this season.
        plantable: usize,
        /// Plants below their stock threshold.
        wanted: usize,
        plots: usize,
        changed: usize,
    },
}
