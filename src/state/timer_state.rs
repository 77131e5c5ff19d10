//! Countdown timer that paces a running stage

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::debug;

use crate::error::TimerError;

use super::WorkoutEvent;

/// Periodic tick source.
///
/// The timer owns no workout counters. Each run gets a new generation number
/// and tags its ticks with it, so ticks still queued from an earlier run can be
/// told apart after a pause. Must be started from within a tokio runtime.
#[derive(Debug)]
pub struct CountdownTimer {
    interval: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
    tick_tx: mpsc::UnboundedSender<WorkoutEvent>,
}

impl CountdownTimer {
    /// Create a stopped timer that will deliver ticks on `tick_tx`
    pub fn new(tick_tx: mpsc::UnboundedSender<WorkoutEvent>) -> Self {
        Self {
            interval: Duration::from_secs(1),
            generation: 0,
            handle: None,
            tick_tx,
        }
    }

    /// Begin ticking once per `interval`
    pub fn start(&mut self, interval: Duration) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::AlreadyRunning);
        }
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval);
        }
        self.interval = interval;
        self.spawn_ticks();
        Ok(())
    }

    /// Stop future ticks. Calling this on a stopped timer does nothing.
    pub fn pause(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Countdown timer generation {} paused", self.generation);
        }
    }

    /// Restart at the interval of the previous run
    pub fn resume(&mut self) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::AlreadyRunning);
        }
        self.spawn_ticks();
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a tick tagged `generation` belongs to the current run
    pub fn accepts(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }

    fn spawn_ticks(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let period = self.interval;
        let tick_tx = self.tick_tx.clone();

        debug!(
            "Countdown timer generation {} started with {:?} interval",
            generation, period
        );

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if tick_tx.send(WorkoutEvent::Tick(generation)).is_err() {
                    break;
                }
            }
        }));
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new(tx);
        let started = Instant::now();

        timer.start(Duration::from_secs(1)).unwrap();

        for expected in 1..=3u64 {
            assert_eq!(rx.recv().await, Some(WorkoutEvent::Tick(1)));
            assert_eq!(started.elapsed(), Duration::from_secs(expected));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new(tx);

        timer.start(Duration::from_secs(1)).unwrap();
        assert_eq!(
            timer.start(Duration::from_secs(1)),
            Err(TimerError::AlreadyRunning)
        );
        assert_eq!(timer.resume(), Err(TimerError::AlreadyRunning));
        assert_eq!(timer.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_then_resume_keeps_interval_and_bumps_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new(tx);

        timer.start(Duration::from_millis(250)).unwrap();
        assert_eq!(rx.recv().await, Some(WorkoutEvent::Tick(1)));

        timer.pause();
        assert!(!timer.is_running());
        assert!(!timer.accepts(1));

        timer.resume().unwrap();
        assert_eq!(timer.interval(), Duration::from_millis(250));
        assert!(timer.accepts(2));

        let resumed = Instant::now();
        assert_eq!(rx.recv().await, Some(WorkoutEvent::Tick(2)));
        assert_eq!(resumed.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new(tx);
        assert_eq!(timer.start(Duration::ZERO), Err(TimerError::ZeroInterval));
        assert!(!timer.is_running());
    }
}
