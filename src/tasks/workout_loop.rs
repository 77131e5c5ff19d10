//! Workout event loop task

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::{
    error::WorkoutError,
    services::{DisplayAdapter, Haptics},
    state::{Flow, WorkoutController, WorkoutEvent, WorkoutState},
};

/// Single consumer for everything that drives the controller.
///
/// Link events, timer ticks and button presses arrive on `events`; BPM
/// readings arrive on `bpm` and only overwrite the last value. Returns the
/// final state once the wearer finishes, or the first fatal error.
pub async fn workout_loop_task<D, H>(
    mut controller: WorkoutController<D, H>,
    mut events: mpsc::UnboundedReceiver<WorkoutEvent>,
    mut bpm: watch::Receiver<Option<u8>>,
) -> Result<WorkoutState, WorkoutError>
where
    D: DisplayAdapter,
    H: Haptics,
{
    info!(
        "Starting workout loop for a {} stage plan ({}s total)",
        controller.plan().len(),
        controller.plan().total_seconds()
    );

    let mut bpm_open = true;

    loop {
        tokio::select! {
            changed = bpm.changed(), if bpm_open => {
                match changed {
                    Ok(()) => {
                        let reading = *bpm.borrow_and_update();
                        if let Some(reading) = reading {
                            controller.on_bpm(reading);
                        }
                    }
                    Err(_) => {
                        debug!("BPM channel closed");
                        bpm_open = false;
                    }
                }
            }

            event = events.recv() => {
                let Some(event) = event else {
                    info!("Event channel closed, stopping workout loop");
                    break;
                };

                match controller.handle(event) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Exit) => break,
                    Err(e) => {
                        error!("Fatal workout error in {}: {}", controller.state(), e);
                        return Err(e);
                    }
                }
            }
        }
    }

    info!("Workout loop finished in {}", controller.state());
    Ok(controller.state())
}
