//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::services::{
    hrm_link::DEFAULT_DEVICE_NAME, LinkConfig, RetryPolicy, SimulatorConfig,
};

const MAX_BACKOFF_FACTOR: f64 = 10.0;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "hr-workout")]
#[command(about = "Heart-rate paced interval workout runner")]
#[command(version)]
pub struct Config {
    /// Advertised name of the heart-rate monitor to pair with
    #[arg(long, default_value = DEFAULT_DEVICE_NAME)]
    pub device_name: String,

    /// How long a single scan may take, in milliseconds
    #[arg(long, default_value = "4000")]
    pub scan_timeout_ms: u64,

    /// Delay before reconnecting after any link failure, in milliseconds
    #[arg(long, default_value = "1000")]
    pub retry_delay_ms: u64,

    /// Multiplier applied to the retry delay after each failure (1.0 to 10.0)
    #[arg(long, default_value = "1.0", value_parser = parse_backoff_factor)]
    pub backoff_factor: f64,

    /// Upper bound for the retry delay, in milliseconds
    #[arg(long, default_value = "30000")]
    pub max_retry_delay_ms: u64,

    /// Give up after this many consecutive retries (retries forever if unset)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Countdown tick length in milliseconds; one tick is one workout second
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// Simulated strap: scans that fail before it is found
    #[arg(long, default_value = "0")]
    pub sim_failures: u32,

    /// Simulated strap: drop the link after this many readings
    #[arg(long)]
    pub sim_drop_after: Option<u32>,

    /// Simulated strap: resting point of the BPM sawtooth
    #[arg(long, default_value = "130")]
    pub sim_bpm: u8,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Retry policy for the heart-rate link
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            delay: Duration::from_millis(self.retry_delay_ms),
            backoff_factor: self.backoff_factor,
            max_delay: Duration::from_millis(self.max_retry_delay_ms),
            max_retries: self.max_retries,
        }
    }

    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            device_name: self.device_name.clone(),
            scan_timeout: Duration::from_millis(self.scan_timeout_ms),
            retry: self.retry_policy(),
        }
    }

    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            failures_before_connect: self.sim_failures,
            drop_after: self.sim_drop_after,
            base_bpm: self.sim_bpm,
            notify_interval: self.tick_interval(),
        }
    }

    /// Countdown interval
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Accept finite backoff factors between 1.0 and 10.0
fn parse_backoff_factor(value: &str) -> Result<f64, String> {
    let factor: f64 = value
        .parse()
        .map_err(|e| format!("'{}' is not a number: {}", value, e))?;
    if !factor.is_finite() || !(1.0..=MAX_BACKOFF_FACTOR).contains(&factor) {
        return Err(format!(
            "backoff factor must be between 1.0 and {}, got {}",
            MAX_BACKOFF_FACTOR, value
        ));
    }
    Ok(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_strap_behaviour() {
        let config = Config::try_parse_from(["hr-workout"]).unwrap();

        assert_eq!(config.link_config(), LinkConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn retry_flags_build_policy() {
        let config = Config::try_parse_from([
            "hr-workout",
            "--retry-delay-ms",
            "500",
            "--backoff-factor",
            "2",
            "--max-retries",
            "5",
            "-v",
        ])
        .unwrap();

        let policy = config.retry_policy();
        assert_eq!(policy.delay, Duration::from_millis(500));
        assert_eq!(policy.backoff_factor, 2.0);
        assert_eq!(policy.max_retries, Some(5));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn rejects_unusable_backoff_factors() {
        for bad in ["inf", "NaN", "1e20", "0.5", "fast"] {
            assert!(
                Config::try_parse_from(["hr-workout", "--backoff-factor", bad]).is_err(),
                "accepted {}",
                bad
            );
        }

        let config = Config::try_parse_from(["hr-workout", "--backoff-factor", "10"]).unwrap();
        assert_eq!(config.backoff_factor, 10.0);
    }
}
