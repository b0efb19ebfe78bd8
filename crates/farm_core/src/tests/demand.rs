use super::*;
use crate::demand::{count_seeds, find_plantable_plants, tally_produce, wanted_by_biome};
use crate::test_fixtures::APPLE;

fn flagged(mut record: ItemRecord, flag: ItemFlag) -> ItemRecord {
    match &mut record {
        ItemRecord::Seeds(item) | ItemRecord::Plant(item) | ItemRecord::PlantGrowth(item) => {
            item.flags.push(flag);
        }
    }
    record
}

#[test]
fn seed_stacks_are_summed_per_plant() {
    let mut world = base_state();
    world.items = vec![
        seeds(1, PLUMP_HELMET, 3),
        seeds(2, PLUMP_HELMET, 4),
        seeds(3, PIG_TAIL, 1),
        harvested(4, CAVE_WHEAT, 9),
    ];
    let counts = count_seeds(&world);
    assert_eq!(counts[&PLUMP_HELMET], 7);
    assert_eq!(counts[&PIG_TAIL], 1);
    assert!(!counts.contains_key(&CAVE_WHEAT));
}

#[test]
fn every_disqualifying_flag_hides_seeds() {
    for flag in DISQUALIFYING_ITEM_FLAGS {
        let mut world = base_state();
        world.items = vec![flagged(seeds(1, PLUMP_HELMET, 5), flag)];
        let plantable = find_plantable_plants(&world, Season::Spring, 0);
        assert!(plantable.is_empty(), "{flag:?} should disqualify seeds");
    }
}

#[test]
fn harmless_flags_keep_seeds_available() {
    let mut world = base_state();
    world.items = vec![flagged(seeds(1, PLUMP_HELMET, 5), ItemFlag::OnGround)];
    let plantable = find_plantable_plants(&world, Season::Spring, 0);
    assert!(plantable.contains_key(&PLUMP_HELMET));
}

#[test]
fn empty_stacks_and_unknown_plants_are_not_plantable() {
    let mut world = base_state();
    world.items = vec![seeds(1, PLUMP_HELMET, 0), seeds(2, PlantId(77), 10)];
    assert!(find_plantable_plants(&world, Season::Spring, 0).is_empty());
}

#[test]
fn trees_and_off_season_plants_are_dropped() {
    let mut world = base_state();
    world.items = vec![
        seeds(1, APPLE, 5),
        seeds(2, STRAWBERRY, 5),
        seeds(3, PIG_TAIL, 5),
    ];
    let spring = find_plantable_plants(&world, Season::Spring, 0);
    assert_eq!(
        spring.keys().copied().collect::<Vec<_>>(),
        vec![PIG_TAIL, STRAWBERRY]
    );
    let autumn = find_plantable_plants(&world, Season::Autumn, 0);
    assert_eq!(autumn.keys().copied().collect::<Vec<_>>(), vec![PIG_TAIL]);
    assert_eq!(autumn[&PIG_TAIL].as_slice(), &[Biome::SubterraneanWater]);
}

#[test]
fn tally_counts_plants_and_growths_for_plantable_only() {
    let mut world = base_state();
    world.items = vec![
        seeds(1, PLUMP_HELMET, 5),
        seeds(2, PIG_TAIL, 5),
        harvested(3, PLUMP_HELMET, 10),
        growth(4, PLUMP_HELMET, 2),
        flagged(harvested(5, PLUMP_HELMET, 50), ItemFlag::Rotten),
        harvested(6, CAVE_WHEAT, 40),
    ];
    let plantable = find_plantable_plants(&world, Season::Spring, 0);
    let counts = tally_produce(&world, &plantable);
    assert_eq!(counts[&PLUMP_HELMET], 12);
    assert_eq!(counts[&PIG_TAIL], 0);
    assert!(!counts.contains_key(&CAVE_WHEAT));
}

#[test]
fn seeds_do_not_count_as_stock() {
    let mut world = base_state();
    world.items = vec![seeds(1, PLUMP_HELMET, 500)];
    let plantable = find_plantable_plants(&world, Season::Spring, 0);
    assert_eq!(tally_produce(&world, &plantable)[&PLUMP_HELMET], 0);
}

#[test]
fn wanted_uses_override_over_default() {
    let mut world = base_state();
    world.items = vec![
        seeds(1, PLUMP_HELMET, 5),
        seeds(2, PIG_TAIL, 5),
        harvested(3, PLUMP_HELMET, 60),
        harvested(4, PIG_TAIL, 60),
    ];
    let plantable = find_plantable_plants(&world, Season::Spring, 0);
    let counts = tally_produce(&world, &plantable);

    let mut state = AutofarmState::new(&Constants::default());
    state.set_threshold(PLUMP_HELMET, 100);
    state.set_default_threshold(10);

    let wanted = wanted_by_biome(&plantable, &counts, &state);
    assert_eq!(
        wanted[&Biome::SubterraneanWater].iter().copied().collect::<Vec<_>>(),
        vec![PLUMP_HELMET]
    );
}

#[test]
fn fully_stocked_plants_are_not_wanted_anywhere() {
    let mut world = base_state();
    world.items = vec![seeds(1, PIG_TAIL, 5), harvested(2, PIG_TAIL, 50)];
    let plantable = find_plantable_plants(&world, Season::Spring, 0);
    let counts = tally_produce(&world, &plantable);
    let state = AutofarmState::new(&Constants::default());
    assert!(wanted_by_biome(&plantable, &counts, &state).is_empty());
}
