//! Biome scope: which biomes a plant may be farmed in.

use crate::{BiomeSet, PlantDef, BIOME_FLAGS};

/// Biomes unlocked by the plant's `BIOME_*` flags, in table order.
/// Pure function, no mutation.
pub fn biomes_for(plant: &PlantDef) -> BiomeSet {
    BIOME_FLAGS
        .iter()
        .filter(|(flag, _)| plant.has(*flag))
        .map(|(_, biome)| *biome)
        .collect()
}
