//! Workout controller: the stage state machine

use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    error::{LinkError, WorkoutError},
    services::{
        display::{Button, DisplayAdapter, Field, FieldId},
        haptics::{Haptics, LINK_LOST_PULSE, STAGE_COMPLETE_PULSES},
    },
};

use super::{
    plan::{format_remaining, WorkoutPlan, WorkoutStage},
    Action, CountdownTimer, WorkoutEvent, WorkoutState,
};

/// Whether the host should keep feeding events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The wearer finished and asked to leave the workout
    Exit,
}

/// Drives a workout plan from link connection to completion.
///
/// The controller never blocks or awaits. It reacts to one event at a time and
/// is the only owner of the workout counters.
#[derive(Debug)]
pub struct WorkoutController<D, H> {
    plan: Arc<WorkoutPlan>,
    display: D,
    haptics: H,
    timer: CountdownTimer,
    tick_interval: Duration,
    state: WorkoutState,
    remaining_seconds: u32,
    current_bpm: Option<u8>,
}

impl<D: DisplayAdapter, H: Haptics> WorkoutController<D, H> {
    pub fn new(
        plan: Arc<WorkoutPlan>,
        display: D,
        haptics: H,
        timer: CountdownTimer,
        tick_interval: Duration,
    ) -> Self {
        Self {
            plan,
            display,
            haptics,
            timer,
            tick_interval,
            state: WorkoutState::Idle,
            remaining_seconds: 0,
            current_bpm: None,
        }
    }

    /// Apply one event
    pub fn handle(&mut self, event: WorkoutEvent) -> Result<Flow, WorkoutError> {
        match event {
            WorkoutEvent::LinkConnected { attempt } => {
                debug!("Link connected (attempt {})", attempt);
                self.on_link_connected();
            }
            WorkoutEvent::LinkLost { attempt, error } => self.on_link_lost(attempt, &error),
            WorkoutEvent::LinkGaveUp { attempts } => {
                error!(
                    "Heart-rate link gave up after {} attempts; readings will stay stale",
                    attempts
                );
            }
            WorkoutEvent::Tick(generation) => {
                if self.timer.accepts(generation) {
                    self.on_tick()?;
                } else {
                    debug!("Dropping stale tick from timer generation {}", generation);
                }
            }
            WorkoutEvent::Button(action) => return self.on_action(action),
        }
        Ok(Flow::Continue)
    }

    /// Record the newest reading. Nothing is redrawn until the next tick.
    pub fn on_bpm(&mut self, bpm: u8) {
        debug!("BPM reading {} (was {:?})", bpm, self.current_bpm);
        self.current_bpm = Some(bpm);
    }

    /// First connection opens the workout; later reconnects change nothing
    pub fn on_link_connected(&mut self) {
        if self.state.has_started() {
            debug!("Link reconnected during {}, workout unaffected", self.state);
            return;
        }

        info!("Heart-rate link ready, awaiting workout start");
        self.state = WorkoutState::AwaitingStart(0);
        self.render_start_screen("Start\nWorkout");
    }

    pub fn on_link_lost(&mut self, attempt: u64, error: &LinkError) {
        warn!(
            "Heart-rate link lost on attempt {} during {}: {}",
            attempt, self.state, error
        );
        self.haptics.buzz(LINK_LOST_PULSE);
    }

    /// Route a button press through the current state
    pub fn on_action(&mut self, action: Action) -> Result<Flow, WorkoutError> {
        match (self.state, action) {
            (WorkoutState::AwaitingStart(index), Action::Start | Action::Resume) => {
                self.begin_stage(index)?;
            }
            // Only reachable from a stale button; the running timer rejects it
            (WorkoutState::Running(index), Action::Start | Action::Resume) => {
                self.begin_stage(index)?;
            }
            (WorkoutState::Running(index), Action::Pause) => self.pause_stage(index),
            (WorkoutState::Paused(index), Action::Start | Action::Resume) => {
                info!("Resuming stage {} with {}s left", index, self.remaining_seconds);
                self.state = WorkoutState::AwaitingStart(index);
                self.render_start_screen("Start\nStage");
            }
            (WorkoutState::Complete, Action::Finish) => {
                info!("Workout finished, returning to launcher");
                return Ok(Flow::Exit);
            }
            (state, action) => debug!("Ignoring {:?} in {}", action, state),
        }
        Ok(Flow::Continue)
    }

    /// Count down one interval of the running stage
    pub fn on_tick(&mut self) -> Result<(), WorkoutError> {
        let WorkoutState::Running(index) = self.state else {
            debug!("Ignoring tick in {}", self.state);
            return Ok(());
        };

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            return self.complete_stage(index);
        }

        let bpm = self.bpm_label();
        self.display.update_field(FieldId::CurrentBpm, &bpm);
        self.display
            .update_field(FieldId::RemainingSeconds, &format_remaining(self.remaining_seconds));
        Ok(())
    }

    fn begin_stage(&mut self, index: usize) -> Result<(), WorkoutError> {
        let plan = Arc::clone(&self.plan);
        let stage = plan.stage(index)?;

        // Start the timer before touching the counter so a rejected start
        // leaves the stage as it was
        if self.remaining_seconds == 0 {
            self.timer.start(self.tick_interval)?;
            self.remaining_seconds = stage.duration_seconds;
            info!(
                "Starting stage {} '{}' for {}s",
                index, stage.name, stage.duration_seconds
            );
        } else {
            self.timer.resume()?;
            info!(
                "Continuing stage {} '{}' with {}s left",
                index, stage.name, self.remaining_seconds
            );
        }

        self.state = WorkoutState::Running(index);
        self.render_timer_screen(stage);
        Ok(())
    }

    fn pause_stage(&mut self, index: usize) {
        self.timer.pause();
        self.state = WorkoutState::Paused(index);
        info!("Paused stage {} with {}s left", index, self.remaining_seconds);

        self.display.render_screen(
            &[Field::new("Paused", 20)],
            &[Button::new("RESUME", Action::Resume)],
        );
    }

    fn complete_stage(&mut self, index: usize) -> Result<(), WorkoutError> {
        self.timer.pause();
        for pulse in STAGE_COMPLETE_PULSES {
            self.haptics.buzz(pulse);
        }

        let next = index + 1;
        if next > self.plan.len() {
            return Err(WorkoutError::StageOutOfRange {
                index: next,
                len: self.plan.len(),
            });
        }

        if next == self.plan.len() {
            info!("Stage {} complete, workout done", index);
            self.state = WorkoutState::Complete;
            self.display.render_screen(
                &[Field::new("All\ndone!", 20)],
                &[Button::new("FINISH", Action::Finish)],
            );
        } else {
            info!("Stage {} complete, next up stage {}", index, next);
            self.state = WorkoutState::AwaitingStart(next);
            self.render_start_screen("Start\nStage");
        }
        Ok(())
    }

    fn render_start_screen(&mut self, title: &str) {
        self.display
            .render_screen(&[Field::new(title, 20)], &[Button::new("START", Action::Start)]);
    }

    fn render_timer_screen(&mut self, stage: &WorkoutStage) {
        let fields = [
            Field::new(stage.name.as_str(), 10),
            Field::with_id(
                format_remaining(self.remaining_seconds),
                20,
                FieldId::RemainingSeconds,
            ),
            Field::with_id(self.bpm_label(), 20, FieldId::CurrentBpm),
            Field::new(format!("BPM: {}-{}", stage.hr_low, stage.hr_high), 10),
            Field::new(format!("Zone: {}", stage.zone_label()), 10),
        ];
        self.display
            .render_screen(&fields, &[Button::new("PAUSE", Action::Pause)]);
    }

    fn bpm_label(&self) -> String {
        self.current_bpm
            .map_or_else(|| "--".to_string(), |bpm| bpm.to_string())
    }

    pub fn state(&self) -> WorkoutState {
        self.state
    }

    /// Current stage index; equals the plan length once complete
    pub fn stage_index(&self) -> usize {
        self.state.stage_index(self.plan.len())
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn current_bpm(&self) -> Option<u8> {
        self.current_bpm
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    /// Generation of the countdown run that is allowed to tick
    pub fn timer_generation(&self) -> u64 {
        self.timer.generation()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }
}
