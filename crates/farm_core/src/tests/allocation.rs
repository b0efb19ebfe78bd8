use super::*;

const A: u32 = 0;
const B: u32 = 1;
const C: u32 = 2;

#[test]
fn nothing_wanted_fallows_every_plot() {
    let mut plots = slots(&[Some(A); 5]);
    let changes = rebalance(&mut plots, &wanted(&[]));
    assert_eq!(changes.len(), 5);
    assert!(changes.iter().all(|c| c.from == Some(PlantId(A)) && c.to.is_none()));
    assert!(plots.iter().all(|slot| slot.crop.is_none()));
}

#[test]
fn nothing_wanted_skips_plots_already_fallow() {
    let mut plots = slots(&[Some(A), None, Some(B), None]);
    let changes = rebalance(&mut plots, &wanted(&[]));
    let changed: Vec<PlotId> = changes.iter().map(|c| c.plot).collect();
    assert_eq!(changed, vec![PlotId(0), PlotId(2)]);
}

#[test]
fn no_plots_is_a_no_op() {
    let mut plots: Vec<Slot> = vec![];
    assert!(rebalance(&mut plots, &wanted(&[A, B])).is_empty());
}

#[test]
fn remainder_goes_to_one_plant() {
    let mut plots = slots(&[Some(A); 7]);
    let changes = rebalance(&mut plots, &wanted(&[A, B, C]));
    let counts = crop_counts(&plots);
    assert_eq!(counts[&Some(PlantId(A))], 3);
    assert_eq!(counts[&Some(PlantId(B))], 2);
    assert_eq!(counts[&Some(PlantId(C))], 2);
    assert_eq!(changes.len(), 4);
    // The first three plots already grew A and keep it.
    assert!(plots[..3].iter().all(|s| s.crop == Some(PlantId(A))));
}

#[test]
fn unwanted_crop_is_replaced_and_balanced_plots_stay() {
    let mut plots = slots(&[Some(A), Some(A), Some(B), Some(C)]);
    let changes = rebalance(&mut plots, &wanted(&[A, B]));
    assert_eq!(
        changes,
        vec![Reassignment {
            plot: PlotId(3),
            from: Some(PlantId(C)),
            to: Some(PlantId(B)),
        }]
    );
}

#[test]
fn surplus_moves_to_missing_plant() {
    let mut plots = slots(&[Some(A); 4]);
    let changes = rebalance(&mut plots, &wanted(&[A, B]));
    let moved: Vec<PlotId> = changes.iter().map(|c| c.plot).collect();
    assert_eq!(moved, vec![PlotId(2), PlotId(3)]);
    assert!(changes.iter().all(|c| c.to == Some(PlantId(B))));
}

#[test]
fn excess_plots_are_handed_out_in_encounter_order() {
    let mut plots = slots(&[Some(B), Some(B), Some(B), Some(A), Some(A), Some(A)]);
    let changes = rebalance(&mut plots, &wanted(&[A, B, C]));
    let moved: Vec<(PlotId, Option<PlantId>)> = changes.iter().map(|c| (c.plot, c.to)).collect();
    assert_eq!(
        moved,
        vec![(PlotId(2), Some(PlantId(C))), (PlotId(5), Some(PlantId(C)))]
    );
}

#[test]
fn balanced_with_remainder_needs_no_change() {
    let mut plots = slots(&[Some(A), Some(A), Some(A), Some(B), Some(B), Some(B), Some(B)]);
    assert!(rebalance(&mut plots, &wanted(&[A, B])).is_empty());
}

#[test]
fn fewer_plots_than_plants_fills_lowest_ids() {
    let mut plots = slots(&[None, None]);
    rebalance(&mut plots, &wanted(&[A, B, C]));
    assert_eq!(plots[0].crop, Some(PlantId(A)));
    assert_eq!(plots[1].crop, Some(PlantId(B)));
}

#[test]
fn second_run_changes_nothing() {
    let mut plots = slots(&[Some(C), None, Some(A), Some(A), Some(A), Some(7), None, Some(B)]);
    let first = rebalance(&mut plots, &wanted(&[A, B, C]));
    assert!(!first.is_empty());
    assert!(rebalance(&mut plots, &wanted(&[A, B, C])).is_empty());
}

#[test]
fn under_quota_plots_are_never_touched() {
    let mut plots = slots(&[Some(A), Some(9), Some(B), Some(9), Some(9), Some(9)]);
    let changes = rebalance(&mut plots, &wanted(&[A, B]));
    assert!(changes.iter().all(|c| c.plot != PlotId(0) && c.plot != PlotId(2)));
    assert_eq!(changes.len(), 4);
}
