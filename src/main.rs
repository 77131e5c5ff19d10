//! HR Workout - A heart-rate paced interval workout runner
//! 
//! This is the main entry point. It runs the built-in plan against a
//! simulated heart-rate strap, with the console standing in for the screen,
//! the vibration motor and the buttons.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use hr_workout::{
    config::Config,
    services::{ConsoleDisplay, ConsoleHaptics, HeartRateMonitorLink, SimulatedTransport},
    state::{CountdownTimer, WorkoutController, WorkoutPlan},
    tasks::{button_input_task, workout_loop_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("hr_workout={}", config.log_level()))
        .init();

    info!("Starting hr-workout v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: device={}, scan_timeout={}ms, retry_delay={}ms, max_retries={:?}, tick={}ms",
        config.device_name,
        config.scan_timeout_ms,
        config.retry_delay_ms,
        config.max_retries,
        config.tick_ms
    );

    let plan = Arc::new(WorkoutPlan::default_plan());
    for (index, stage) in plan.iter().enumerate() {
        info!(
            "  Stage {}: {} {}s @ {}-{} bpm ({:?})",
            index, stage.name, stage.duration_seconds, stage.hr_low, stage.hr_high, stage.intensity
        );
    }

    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Heart-rate link runs on its own task and reports through the event channel
    let transport = SimulatedTransport::new(config.simulator_config());
    let mut link = HeartRateMonitorLink::new(transport, config.link_config(), event_tx.clone());
    let bpm_rx = link.subscribe_bpm();
    let status_rx = link.subscribe_status();
    let link_task = tokio::spawn(async move {
        if let Err(e) = link.run().await {
            error!("Heart-rate link stopped: {}", e);
        }
    });

    let display = ConsoleDisplay::new();
    let input_task = tokio::spawn(button_input_task(display.clone(), event_tx.clone()));

    let controller = WorkoutController::new(
        plan,
        display,
        ConsoleHaptics,
        CountdownTimer::new(event_tx),
        config.tick_interval(),
    );

    let outcome = tokio::select! {
        result = workout_loop_task(controller, event_rx, bpm_rx) => Some(result),
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            None
        }
    };

    link_task.abort();
    input_task.abort();

    let status = status_rx.borrow().clone();
    info!("Final link status: {}", serde_json::to_string(&status)?);

    let code = match outcome {
        Some(Ok(state)) => {
            info!("Workout ended in {}", state);
            0
        }
        Some(Err(e)) => {
            error!("Workout aborted: {}", e);
            1
        }
        None => {
            info!("Workout interrupted");
            0
        }
    };

    info!("Shutdown complete");
    // The blocking stdin reader cannot be cancelled and would hold the runtime open
    std::process::exit(code);
}
