//! Workout plan structure and stage lookup

use std::slice::Iter;

use serde::Serialize;

use crate::error::WorkoutError;

/// Lower heart-rate bound to zone label, display only
const HEART_RATE_ZONES: [(u8, &str); 7] = [
    (124, "1"),
    (139, "2"),
    (155, "X"),
    (163, "3"),
    (172, "Y"),
    (175, "4"),
    (181, "5"),
];

/// Stage intensity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Warmup,
    Active,
    Cooldown,
}

/// One time-boxed segment of a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkoutStage {
    pub name: String,
    pub duration_seconds: u32,
    pub hr_low: u8,
    pub hr_high: u8,
    pub intensity: Intensity,
}

impl WorkoutStage {
    /// Create a validated stage
    pub fn new(
        name: impl Into<String>,
        duration_seconds: u32,
        hr_low: u8,
        hr_high: u8,
        intensity: Intensity,
    ) -> Result<Self, WorkoutError> {
        let name = name.into();
        if duration_seconds == 0 {
            return Err(WorkoutError::InvalidPlan(format!(
                "stage '{}' has a zero duration",
                name
            )));
        }
        if hr_high < hr_low {
            return Err(WorkoutError::InvalidPlan(format!(
                "stage '{}' has hr_high {} below hr_low {}",
                name, hr_high, hr_low
            )));
        }

        Ok(Self {
            name,
            duration_seconds,
            hr_low,
            hr_high,
            intensity,
        })
    }

    /// Zone label for this stage's target range
    pub fn zone_label(&self) -> &'static str {
        zone_label(self.hr_low)
    }
}

/// Immutable, ordered sequence of stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkoutPlan {
    stages: Vec<WorkoutStage>,
}

impl WorkoutPlan {
    /// Build a plan from already validated stages. An empty plan is rejected.
    pub fn new(stages: Vec<WorkoutStage>) -> Result<Self, WorkoutError> {
        if stages.is_empty() {
            return Err(WorkoutError::InvalidPlan(
                "a plan needs at least one stage".to_string(),
            ));
        }
        Ok(Self { stages })
    }

    /// The built-in interval session: warm-up, four work stages, cooldown
    pub fn default_plan() -> Self {
        use Intensity::*;

        let stages = [
            ("Warm-up", 300, 124, 139, Warmup),
            ("Active", 1200, 139, 155, Active),
            ("Steady State", 480, 155, 163, Active),
            ("Lactate Threshold", 240, 163, 172, Active),
            ("Critical Velocity", 120, 175, 181, Active),
            ("Cooldown", 300, 124, 139, Cooldown),
        ]
        .into_iter()
        .map(|(name, duration, low, high, intensity)| WorkoutStage {
            name: name.to_string(),
            duration_seconds: duration,
            hr_low: low,
            hr_high: high,
            intensity,
        })
        .collect();

        Self { stages }
    }

    /// Look up a stage, failing if `index` is past the end of the plan
    pub fn stage(&self, index: usize) -> Result<&WorkoutStage, WorkoutError> {
        self.stages.get(index).ok_or(WorkoutError::StageOutOfRange {
            index,
            len: self.stages.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, WorkoutStage> {
        self.stages.iter()
    }

    /// Sum of all stage durations in seconds
    pub fn total_seconds(&self) -> u64 {
        self.stages.iter().map(|s| u64::from(s.duration_seconds)).sum()
    }
}

/// Map a stage's lower heart-rate bound to its short zone label
pub fn zone_label(hr_low: u8) -> &'static str {
    HEART_RATE_ZONES
        .iter()
        .find(|(bound, _)| *bound == hr_low)
        .map(|(_, label)| *label)
        .unwrap_or("?")
}

/// Format seconds as zero-padded `MM:SS`
pub fn format_remaining(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_matches_interval_session() {
        let plan = WorkoutPlan::default_plan();
        let durations: Vec<u32> = plan.iter().map(|s| s.duration_seconds).collect();

        assert_eq!(durations, vec![300, 1200, 480, 240, 120, 300]);
        assert_eq!(plan.total_seconds(), 2640);
        assert_eq!(plan.stage(0).unwrap().intensity, Intensity::Warmup);
        assert_eq!(plan.stage(5).unwrap().intensity, Intensity::Cooldown);
    }

    #[test]
    fn stage_past_end_is_out_of_range() {
        let plan = WorkoutPlan::default_plan();
        assert_eq!(
            plan.stage(6),
            Err(WorkoutError::StageOutOfRange { index: 6, len: 6 })
        );
    }

    #[test]
    fn stage_validation() {
        assert!(WorkoutStage::new("zero", 0, 120, 130, Intensity::Active).is_err());
        assert!(WorkoutStage::new("inverted", 60, 150, 140, Intensity::Active).is_err());
        assert!(WorkoutStage::new("flat", 60, 140, 140, Intensity::Active).is_ok());
        assert!(WorkoutPlan::new(Vec::new()).is_err());
    }

    #[test]
    fn zone_labels() {
        assert_eq!(zone_label(124), "1");
        assert_eq!(zone_label(155), "X");
        assert_eq!(zone_label(172), "Y");
        assert_eq!(zone_label(181), "5");
        assert_eq!(zone_label(100), "?");

        let plan = WorkoutPlan::default_plan();
        let labels: Vec<&str> = plan.iter().map(|s| s.zone_label()).collect();
        assert_eq!(labels, vec!["1", "2", "X", "3", "4", "1"]);
    }

    #[test]
    fn remaining_time_formatting() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(59), "00:59");
        assert_eq!(format_remaining(300), "05:00");
        assert_eq!(format_remaining(1199), "19:59");
    }

    #[test]
    fn plan_serializes_for_status_output() {
        let plan = WorkoutPlan::default_plan();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["stages"][0]["name"], "Warm-up");
        assert_eq!(json["stages"][0]["intensity"], "warmup");
        assert_eq!(json["stages"][5]["intensity"], "cooldown");
    }
}
