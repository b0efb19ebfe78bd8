use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Constants, Counters, PlantId};

/// Engine state that outlives a single run: the on/off switch, stock
/// thresholds, and the tally from the last run (kept for status output).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutofarmState {
    enabled: bool,
    default_threshold: u32,
    thresholds: BTreeMap<PlantId, u32>,
    last_counts: BTreeMap<PlantId, u32>,
    pub(crate) counters: Counters,
}

impl AutofarmState {
    /// Disabled, with no overrides and the configured default threshold.
    pub fn new(constants: &Constants) -> Self {
        Self {
            enabled: false,
            default_threshold: constants.default_threshold,
            thresholds: BTreeMap::new(),
            last_counts: BTreeMap::new(),
            counters: Counters::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Override if one was set for `plant`, otherwise the default.
    pub fn threshold(&self, plant: PlantId) -> u32 {
        self.thresholds
            .get(&plant)
            .copied()
            .unwrap_or(self.default_threshold)
    }

    pub fn set_threshold(&mut self, plant: PlantId, value: u32) {
        self.thresholds.insert(plant, value);
    }

    pub fn default_threshold(&self) -> u32 {
        self.default_threshold
    }

    pub fn set_default_threshold(&mut self, value: u32) {
        self.default_threshold = value;
    }

    pub fn thresholds(&self) -> &BTreeMap<PlantId, u32> {
        &self.thresholds
    }

    pub fn last_counts(&self) -> &BTreeMap<PlantId, u32> {
        &self.last_counts
    }

    pub(crate) fn record_counts(&mut self, counts: BTreeMap<PlantId, u32>) {
        self.last_counts = counts;
    }

    /// True if the stock on hand is below the plant's threshold.
    pub fn needs_more(&self, plant: PlantId, on_hand: u32) -> bool {
        on_hand < self.threshold(plant)
    }
}
