use crate::{PlantDef, PlantFlag, Season, GROW_DURATION_SCALE, SEASON_LENGTH};

/// Returns true if a crop of `plant` sown now would be harvested before its
/// growing seasons run out.
///
/// The plant must have seeds, must not be a tree, and must grow in the current
/// season. Growth that runs past the end of the season rolls into the next
/// one (winter wraps to spring), and every season entered must be a growing
/// season for the plant.
pub fn is_plantable(plant: &PlantDef, season: Season, season_tick: u64) -> bool {
    let mut season = season;
    let mut harvest = season_tick + u64::from(plant.grow_duration) * GROW_DURATION_SCALE;
    let mut can_plant =
        plant.has(PlantFlag::Seed) && !plant.has(PlantFlag::Tree) && plant.grows_in(season);

    // Once false the answer cannot flip back, so stop rolling seasons.
    while can_plant && harvest >= SEASON_LENGTH {
        season = season.next();
        harvest -= SEASON_LENGTH;
        can_plant = plant.grows_in(season);
    }

    can_plant
}
