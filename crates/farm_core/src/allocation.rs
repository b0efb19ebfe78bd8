//! Fair plot reassignment.
//!
//! Spreads a biome's plots as evenly as possible over the wanted plants while
//! changing as few plots as it can. With `n` plots and `k` plants every plant
//! gets `n / k` plots, and `n % k` of them get one more.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{PlantId, PlotId};

/// One plot's crop for the season being balanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub plot: PlotId,
    /// `None` is fallow.
    pub crop: Option<PlantId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reassignment {
    pub plot: PlotId,
    pub from: Option<PlantId>,
    pub to: Option<PlantId>,
}

/// Per-plant share of the plots: `quota` each, plus one for as many plants
/// as there are `extra` credits left.
struct Quota {
    quota: usize,
    extra: usize,
}

impl Quota {
    fn new(slots: usize, plants: usize) -> Self {
        Self {
            quota: slots / plants,
            extra: slots % plants,
        }
    }

    fn has_room(&self, count: usize) -> bool {
        count < self.quota || (count == self.quota && self.extra > 0)
    }

    /// Records one more plot for a plant currently holding `count`.
    fn take(&mut self, count: &mut usize) {
        if *count == self.quota {
            self.extra -= 1;
        }
        *count += 1;
    }
}

/// Rebalances `slots` across `wanted` in place and returns one record per
/// plot whose crop actually changed.
///
/// Plots already growing a wanted plant keep it until that plant is at its
/// share; the rest (unwanted crops, fallow, surplus) are handed out in input
/// order to wanted plants in ascending id order. With nothing wanted every
/// plot goes fallow.
pub fn rebalance(slots: &mut [Slot], wanted: &BTreeSet<PlantId>) -> Vec<Reassignment> {
    let mut changes = Vec::new();

    if wanted.is_empty() {
        for slot in slots.iter_mut() {
            assign(slot, None, &mut changes);
        }
        return changes;
    }
    if slots.is_empty() {
        return changes;
    }

    let mut quota = Quota::new(slots.len(), wanted.len());
    let mut counts: BTreeMap<PlantId, usize> = BTreeMap::new();
    let mut excess: VecDeque<usize> = VecDeque::new();

    for (idx, slot) in slots.iter().enumerate() {
        let Some(crop) = slot.crop.filter(|crop| wanted.contains(crop)) else {
            excess.push_back(idx);
            continue;
        };
        let count = counts.entry(crop).or_insert(0);
        if quota.has_room(*count) {
            quota.take(count);
        } else {
            excess.push_back(idx);
        }
    }

    for plant in wanted {
        let mut count = counts.get(plant).copied().unwrap_or(0);
        while quota.has_room(count) {
            let Some(idx) = excess.pop_front() else {
                break;
            };
            assign(&mut slots[idx], Some(*plant), &mut changes);
            quota.take(&mut count);
        }
    }

    changes
}

fn assign(slot: &mut Slot, crop: Option<PlantId>, changes: &mut Vec<Reassignment>) {
    if slot.crop == crop {
        return;
    }
    changes.push(Reassignment {
        plot: slot.plot,
        from: slot.crop,
        to: crop,
    });
    slot.crop = crop;
}
