//! Interfaces to the world the engine runs against, and their implementation
//! for the in-memory `FortressState`.

use crate::{
    Biome, FarmPlot, FortressState, ItemClass, ItemRecord, PlantDef, PlantId, PlotId, Position,
    Season,
};

/// Read access to plants, items and plots, plus the single write the engine
/// performs: setting a plot's crop for a season.
pub trait WorldQuery {
    /// False when the globals the command surface depends on are missing.
    fn has_required_state(&self) -> bool {
        true
    }

    fn plant_raws(&self) -> &[PlantDef];

    /// Looks a plant up by raw index. `None` for ids with no definition.
    fn plant(&self, id: PlantId) -> Option<&PlantDef> {
        self.plant_raws()
            .get(id.0 as usize)
            .filter(|plant| plant.id == id)
            .or_else(|| self.plant_raws().iter().find(|plant| plant.id == id))
    }

    fn items(&self, class: ItemClass) -> impl Iterator<Item = &ItemRecord>;

    fn farm_plots(&self) -> Vec<FarmPlot>;

    fn is_subterranean(&self, pos: Position) -> bool;

    fn region_biome(&self, pos: Position) -> Biome;

    /// Writes one season's crop on a plot. Unknown plot ids are ignored.
    fn set_plot_crop(&mut self, plot: PlotId, season: Season, crop: Option<PlantId>);
}

pub trait Clock {
    fn current_season(&self) -> Season;
    fn season_tick(&self) -> u64;
    fn is_paused(&self) -> bool;
    fn is_world_loaded(&self) -> bool;
    fn frame_counter(&self) -> u64;
}

/// Biome a plot at `pos` farms in. Underground tiles always count as
/// subterranean water regardless of the region above them.
pub fn biome_of(world: &impl WorldQuery, pos: Position) -> Biome {
    if world.is_subterranean(pos) {
        Biome::SubterraneanWater
    } else {
        world.region_biome(pos)
    }
}

/// Display name for a crop, `NONE` for fallow or unknown plants.
pub fn plant_name(world: &impl WorldQuery, crop: Option<PlantId>) -> &str {
    crop.and_then(|id| world.plant(id))
        .map_or("NONE", |plant| plant.name.as_str())
}

impl WorldQuery for FortressState {
    fn has_required_state(&self) -> bool {
        !self.plants.is_empty()
    }

    fn plant_raws(&self) -> &[PlantDef] {
        &self.plants
    }

    fn items(&self, class: ItemClass) -> impl Iterator<Item = &ItemRecord> {
        self.items.iter().filter(move |item| item.class() == class)
    }

    fn farm_plots(&self) -> Vec<FarmPlot> {
        self.plots.clone()
    }

    fn is_subterranean(&self, pos: Position) -> bool {
        pos.z < self.surface_z
    }

    fn region_biome(&self, pos: Position) -> Biome {
        self.regions
            .iter()
            .find(|region| region.contains(pos))
            .map_or(self.default_biome, |region| region.biome)
    }

    fn set_plot_crop(&mut self, plot: PlotId, season: Season, crop: Option<PlantId>) {
        if let Some(target) = self.plots.iter_mut().find(|p| p.id == plot) {
            target.crops[season.index()] = crop;
        }
    }
}

impl Clock for FortressState {
    fn current_season(&self) -> Season {
        self.meta.season
    }

    fn season_tick(&self) -> u64 {
        self.meta.season_tick
    }

    fn is_paused(&self) -> bool {
        self.meta.paused
    }

    fn is_world_loaded(&self) -> bool {
        self.meta.map_loaded
    }

    fn frame_counter(&self) -> u64 {
        self.meta.frame_counter
    }
}
