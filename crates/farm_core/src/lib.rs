//! `farm_core`: deterministic farm plot allocation.
//!
//! No IO, no logging. The world is reached only through `WorldQuery` and `Clock`.

pub mod allocation;
mod biomes;
pub mod demand;
mod eligibility;
mod engine;
mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
mod types;
mod world;

pub use allocation::{rebalance, Reassignment, Slot};
pub use biomes::biomes_for;
pub use eligibility::is_plantable;
pub use engine::{on_update, run_once};
pub use state::AutofarmState;
pub use types::*;
pub use world::{biome_of, plant_name, Clock, WorldQuery};

pub(crate) fn emit(counters: &mut Counters, frame: u64, event: Event) -> EventEnvelope {
    counters.next_event_id += 1;
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    EventEnvelope { id, frame, event }
}

#[cfg(test)]
mod tests;
