use crate::state::{EventTx, SharedSim};
use farm_control::change_lines;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Advances the fortress one frame per interval and hands every frame to the
/// allocator. Event batches from allocator runs go out on `event_tx`.
pub async fn run_frame_loop(
    sim: SharedSim,
    event_tx: EventTx,
    frames_per_sec: f64,
    max_frames: Option<u64>,
    paused: Arc<AtomicBool>,
) {
    let mut interval = if frames_per_sec > 0.0 {
        let mut iv = tokio::time::interval(Duration::from_secs_f64(1.0 / frames_per_sec));
        iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);
        Some(iv)
    } else {
        None
    };

    loop {
        if paused.load(Ordering::Relaxed) {
            tokio::time::sleep(Duration::from_millis(50)).await;
            continue;
        }

        let (events, done) = {
            let mut guard = sim.lock();
            let state = &mut *guard;
            farm_world::advance_frame(&mut state.fortress);
            let events = state.controller.on_update(&mut state.fortress);
            if let Some(events) = &events {
                for line in change_lines(events, &state.fortress) {
                    tracing::info!("{line}");
                }
            }
            let done = max_frames.is_some_and(|max| state.fortress.meta.frame_counter >= max);
            (events, done)
        };

        if let Some(events) = events {
            // No subscribers is fine.
            let _ = event_tx.send(events);
        }

        if done {
            break;
        }

        if let Some(ref mut iv) = interval {
            iv.tick().await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}
