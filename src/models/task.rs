use chrono::{DateTime, FixedOffset, Weekday};
use serde::{Deserialize, Serialize};

pub const MIN_BLOCK_FLOOR_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Day-of-week plus local time-of-day range a task would rather be worked in.
/// `start`/`end` are `HH:MM` strings, interpreted half-open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferredTimeWindow {
    pub days_of_week: Vec<Weekday>,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub estimated_minutes: i64,
    #[serde(default)]
    pub completed_minutes: i64,
    #[serde(default)]
    pub deadline: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub earliest_start: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub energy_level: EnergyLevel,
    #[serde(default = "default_interruptible")]
    pub interruptible: bool,
    #[serde(default = "default_min_block_minutes")]
    pub min_block_minutes: i64,
    #[serde(default)]
    pub max_block_minutes: Option<i64>,
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,
    #[serde(default)]
    pub preferred_time_windows: Option<Vec<PreferredTimeWindow>>,
    #[serde(default)]
    pub assumptions: Option<Vec<String>>,
}

impl Task {
    /// Interruptible, medium-energy task with no deadline and a 30 minute minimum block.
    pub fn new(id: impl Into<String>, title: impl Into<String>, estimated_minutes: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            estimated_minutes,
            completed_minutes: 0,
            deadline: None,
            earliest_start: None,
            priority: 0,
            energy_level: EnergyLevel::default(),
            interruptible: default_interruptible(),
            min_block_minutes: default_min_block_minutes(),
            max_block_minutes: None,
            dependencies: None,
            preferred_time_windows: None,
            assumptions: None,
        }
    }
}

fn default_interruptible() -> bool {
    true
}

fn default_min_block_minutes() -> i64 {
    MIN_BLOCK_FLOOR_MINUTES
}
