use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::calendar::CalendarEvent;
use crate::models::settings::Settings;
use crate::models::task::Task;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    FirstAvailable,
    Chunked,
    PreferredWindow,
    EarliestSlot,
    NearDeadline,
    NormalBuffer,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::FirstAvailable => "FIRST_AVAILABLE",
            ReasonCode::Chunked => "CHUNKED",
            ReasonCode::PreferredWindow => "PREFERRED_WINDOW",
            ReasonCode::EarliestSlot => "EARLIEST_SLOT",
            ReasonCode::NearDeadline => "NEAR_DEADLINE",
            ReasonCode::NormalBuffer => "NORMAL_BUFFER",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    DeadlineAlreadyPassed,
    InsufficientTime,
    OutsideWorkHours,
    OverlapsBusy,
    BlockOverlap,
    DailyCapExceeded,
}

impl WarningCode {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningCode::DeadlineAlreadyPassed => "DEADLINE_ALREADY_PASSED",
            WarningCode::InsufficientTime => "INSUFFICIENT_TIME",
            WarningCode::OutsideWorkHours => "OUTSIDE_WORK_HOURS",
            WarningCode::OverlapsBusy => "OVERLAPS_BUSY",
            WarningCode::BlockOverlap => "BLOCK_OVERLAP",
            WarningCode::DailyCapExceeded => "DAILY_CAP_EXCEEDED",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannedBlock {
    pub id: String,
    pub task_id: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub confidence: f64,
    #[serde(default)]
    pub reason_codes: Vec<ReasonCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl PlannedBlock {
    pub fn is_locked(&self) -> bool {
        self.locked.unwrap_or(false)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_minutes()
    }

    /// Same block pinned in place for the next run.
    pub fn into_locked(mut self) -> Self {
        self.locked = Some(true);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanWarning {
    pub code: WarningCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl PlanWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            task_id: None,
        }
    }

    pub fn for_task(code: WarningCode, task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            task_id: Some(task_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub blocks: Vec<PlannedBlock>,
    pub warnings: Vec<PlanWarning>,
    pub assumptions: Vec<String>,
    pub generated_at: DateTime<FixedOffset>,
}

impl PlanResult {
    pub fn blocks_for_task<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a PlannedBlock> + 'a {
        self.blocks.iter().filter(move |block| block.task_id == task_id)
    }

    pub fn scheduled_minutes_for(&self, task_id: &str) -> i64 {
        self.blocks_for_task(task_id)
            .map(PlannedBlock::duration_minutes)
            .sum()
    }

    pub fn warnings_for_task<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a PlanWarning> + 'a {
        self.warnings
            .iter()
            .filter(move |warning| warning.task_id.as_deref() == Some(task_id))
    }

    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|warning| warning.code == code)
    }
}

/// How `dependencies` influence the processing order of tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum DependencyMode {
    /// Deadline/priority/title order only; a dependency is honoured when its blocks
    /// happen to be placed before the dependent task is processed.
    #[default]
    BestEffort,
    /// Dependencies are placed before their dependents, ties broken by the
    /// deadline/priority/title order.
    Topological,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerOptions {
    pub dependency_mode: DependencyMode,
}

/// JSON envelope accepted by the command layer and the `planner` binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub locked_blocks: Vec<PlannedBlock>,
    #[serde(default)]
    pub options: PlannerOptions,
}
