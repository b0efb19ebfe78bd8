use super::*;
use crate::test_fixtures::plant_def;

fn seeded(seasons: &[Season], grow_duration: u32) -> PlantDef {
    plant_def(0, "TEST_PLANT", seasons, grow_duration, &[PlantFlag::Seed])
}

#[test]
fn zero_duration_depends_only_on_current_season() {
    let plant = seeded(&[Season::Summer], 0);
    assert!(is_plantable(&plant, Season::Summer, 10_079));
    assert!(!is_plantable(&plant, Season::Spring, 0));
}

#[test]
fn seedless_plants_are_never_plantable() {
    let plant = plant_def(0, "REED", &Season::ALL, 1, &[]);
    assert!(!is_plantable(&plant, Season::Spring, 0));
}

#[test]
fn trees_are_never_plantable() {
    let plant = plant_def(0, "APPLE", &Season::ALL, 1, &[PlantFlag::Seed, PlantFlag::Tree]);
    assert!(!is_plantable(&plant, Season::Spring, 0));
}

#[test]
fn growth_within_the_season_only_needs_current_season() {
    let plant = seeded(&[Season::Spring], 100);
    assert!(is_plantable(&plant, Season::Spring, 1_000));
}

#[test]
fn harvest_landing_exactly_on_season_end_rolls_over() {
    let plant = seeded(&[Season::Spring], 1_000);
    assert!(is_plantable(&plant, Season::Spring, 79));
    assert!(!is_plantable(&plant, Season::Spring, 80));
}

#[test]
fn one_rollover_into_a_growing_season() {
    // 9000 + 2000 = 11000: finishes 920 ticks into summer.
    let plant = seeded(&[Season::Spring, Season::Summer], 200);
    assert!(is_plantable(&plant, Season::Spring, 9_000));
}

#[test]
fn two_rollovers_hitting_a_dead_season() {
    // 9000 + 12000 = 21000: passes through summer into autumn.
    let plant = seeded(&[Season::Spring, Season::Summer], 1_200);
    assert!(!is_plantable(&plant, Season::Spring, 9_000));
}

#[test]
fn three_rollovers_need_every_season_crossed() {
    let year_round = seeded(&Season::ALL, 3_024);
    let no_winter = seeded(&[Season::Spring, Season::Summer, Season::Autumn], 3_024);
    assert!(is_plantable(&year_round, Season::Spring, 0));
    assert!(!is_plantable(&no_winter, Season::Spring, 0));
    // One tick short of three full seasons stops in autumn.
    let shorter = seeded(&[Season::Spring, Season::Summer, Season::Autumn], 3_023);
    assert!(is_plantable(&shorter, Season::Spring, 9));
}

#[test]
fn winter_wraps_to_spring() {
    let winter_spring = seeded(&[Season::Winter, Season::Spring], 10);
    let winter_only = seeded(&[Season::Winter], 10);
    assert!(is_plantable(&winter_spring, Season::Winter, 10_000));
    assert!(!is_plantable(&winter_only, Season::Winter, 10_000));
}

#[test]
fn multi_year_growth_does_not_overflow() {
    let plant = seeded(&Season::ALL, u32::MAX);
    assert!(is_plantable(&plant, Season::Autumn, SEASON_LENGTH - 1));
}
