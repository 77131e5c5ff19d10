//! End-to-end workout runs

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::sync::mpsc;

use hr_workout::{
    services::{
        Button, DisplayAdapter, Field, FieldId, Haptics, HeartRateMonitorLink, LinkConfig,
        SimulatedTransport, SimulatorConfig,
    },
    state::{
        Action, CountdownTimer, Intensity, WorkoutController, WorkoutEvent, WorkoutPlan,
        WorkoutStage, WorkoutState,
    },
    tasks::workout_loop_task,
};

/// Display that presses every START/RESUME/FINISH button it renders
#[derive(Clone)]
struct Autopilot {
    events: mpsc::UnboundedSender<WorkoutEvent>,
    screens: Arc<Mutex<Vec<String>>>,
    bpm_updates: Arc<Mutex<Vec<String>>>,
}

impl DisplayAdapter for Autopilot {
    fn render_screen(&mut self, fields: &[Field], buttons: &[Button]) {
        if let Some(first) = fields.first() {
            self.screens.lock().unwrap().push(first.label.clone());
        }
        if let Some(button) = buttons.iter().find(|b| b.action != Action::Pause) {
            let _ = self.events.send(WorkoutEvent::Button(button.action));
        }
    }

    fn update_field(&mut self, id: FieldId, value: &str) {
        if id == FieldId::CurrentBpm {
            self.bpm_updates.lock().unwrap().push(value.to_string());
        }
    }
}

#[derive(Clone, Default)]
struct Buzzes(Arc<Mutex<Vec<u32>>>);

impl Haptics for Buzzes {
    fn buzz(&mut self, millis: u32) {
        self.0.lock().unwrap().push(millis);
    }
}

/// Display that ignores everything
struct Blank;

impl DisplayAdapter for Blank {
    fn render_screen(&mut self, _: &[Field], _: &[Button]) {}
    fn update_field(&mut self, _: FieldId, _: &str) {}
}

#[tokio::test(start_paused = true)]
async fn default_plan_runs_to_completion_in_2640_ticks() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let plan = Arc::new(WorkoutPlan::default_plan());
    let mut controller = WorkoutController::new(
        Arc::clone(&plan),
        Blank,
        Buzzes::default(),
        CountdownTimer::new(tx),
        Duration::from_secs(1),
    );

    controller.on_link_connected();
    controller.on_action(Action::Start).unwrap();

    for _ in 0..299 {
        controller.on_tick().unwrap();
    }
    assert_eq!(controller.state(), WorkoutState::Running(0));
    controller.on_tick().unwrap();
    assert_eq!(controller.state(), WorkoutState::AwaitingStart(1));

    let mut ticks: u64 = 300;
    while !controller.state().is_complete() {
        if let WorkoutState::AwaitingStart(_) = controller.state() {
            controller.on_action(Action::Start).unwrap();
        }
        controller.on_tick().unwrap();
        ticks += 1;

        if ticks < 2640 {
            assert!(!controller.state().is_complete(), "completed early at tick {}", ticks);
        }
    }

    assert_eq!(ticks, 2640);
    assert_eq!(controller.stage_index(), plan.len());
}

#[tokio::test(start_paused = true)]
async fn simulated_strap_drives_full_workout() {
    let plan = Arc::new(
        WorkoutPlan::new(vec![
            WorkoutStage::new("Warm-up", 3, 124, 139, Intensity::Warmup).unwrap(),
            WorkoutStage::new("Cooldown", 2, 124, 139, Intensity::Cooldown).unwrap(),
        ])
        .unwrap(),
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let transport = SimulatedTransport::new(SimulatorConfig {
        failures_before_connect: 2,
        drop_after: Some(3),
        base_bpm: 130,
        notify_interval: Duration::from_millis(400),
    });
    let mut link = HeartRateMonitorLink::new(transport, LinkConfig::default(), tx.clone());
    let bpm = link.subscribe_bpm();
    let link_task = tokio::spawn(async move { link.run().await });

    let screens = Arc::new(Mutex::new(Vec::new()));
    let bpm_updates = Arc::new(Mutex::new(Vec::new()));
    let buzzes = Buzzes::default();
    let display = Autopilot {
        events: tx.clone(),
        screens: Arc::clone(&screens),
        bpm_updates: Arc::clone(&bpm_updates),
    };
    let controller = WorkoutController::new(
        plan,
        display,
        buzzes.clone(),
        CountdownTimer::new(tx),
        Duration::from_secs(1),
    );

    let result = workout_loop_task(controller, rx, bpm).await;
    link_task.abort();

    assert_eq!(result, Ok(WorkoutState::Complete));

    let screens = screens.lock().unwrap();
    assert_eq!(screens.first().map(String::as_str), Some("Start\nWorkout"));
    assert_eq!(screens.last().map(String::as_str), Some("All\ndone!"));
    assert_eq!(screens.iter().filter(|s| s.as_str() == "Start\nStage").count(), 1);

    let buzzes = buzzes.0.lock().unwrap();
    assert_eq!(buzzes.iter().filter(|&&b| b == 1200).count(), 2);
    assert!(buzzes.iter().filter(|&&b| b == 100).count() >= 2);

    // Readings reached the screen through ticks
    assert!(bpm_updates
        .lock()
        .unwrap()
        .iter()
        .any(|value| value.parse::<u8>().is_ok()));
}
