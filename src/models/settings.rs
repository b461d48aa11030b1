use serde::{Deserialize, Serialize};

/// Configuration snapshot for one scheduling run. Time fields are 24-hour `HH:MM`
/// local-time strings in `timezone`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub timezone: String,
    pub planning_horizon_days: u32,
    pub work_day_start: String,
    pub work_day_end: String,
    pub lunch_start: String,
    pub lunch_end: String,
    pub max_daily_minutes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            planning_horizon_days: 7,
            work_day_start: "09:00".to_string(),
            work_day_end: "18:00".to_string(),
            lunch_start: "12:00".to_string(),
            lunch_end: "13:00".to_string(),
            max_daily_minutes: 360,
        }
    }
}
