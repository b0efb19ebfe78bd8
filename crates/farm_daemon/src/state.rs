use farm_control::AutofarmController;
use farm_core::{EventEnvelope, FortressState};
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct SimState {
    pub fortress: FortressState,
    pub controller: AutofarmController,
}

pub type SharedSim = Arc<Mutex<SimState>>;
pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

#[derive(Clone)]
pub struct AppState {
    pub sim: SharedSim,
    pub event_tx: EventTx,
    pub frames_per_sec: f64,
    /// Stops the frame loop; the fortress clock itself is untouched.
    pub paused: Arc<AtomicBool>,
}
