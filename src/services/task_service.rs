use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use tracing::warn;

use crate::models::task::{PreferredTimeWindow, Task};
use crate::services::schedule_utils;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWindow {
    pub days_of_week: Vec<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ResolvedWindow {
    fn from_window(window: &PreferredTimeWindow) -> Option<Self> {
        let start = schedule_utils::parse_clock_time(&window.start)?;
        let end = schedule_utils::parse_clock_time(&window.end)?;
        (start < end).then(|| Self {
            days_of_week: window.days_of_week.clone(),
            start,
            end,
        })
    }

    /// Day-of-week membership plus `[start, end)` on the local clock.
    pub fn contains(&self, tz: &Tz, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(tz);
        let time = local.time();
        self.days_of_week.contains(&local.weekday()) && self.start <= time && time < self.end
    }
}

/// A task with its optional fields resolved once, so allocation never re-derives defaults.
#[derive(Debug, Clone)]
pub struct ResolvedTask<'a> {
    pub task: &'a Task,
    pub earliest_start: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub dependencies: &'a [String],
    pub preferred_windows: Vec<ResolvedWindow>,
}

impl<'a> ResolvedTask<'a> {
    pub fn resolve(task: &'a Task) -> Self {
        let preferred_windows = task
            .preferred_time_windows
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|window| {
                let resolved = ResolvedWindow::from_window(window);
                if resolved.is_none() {
                    warn!(target: "app::planning", task_id = %task.id, start = %window.start, end = %window.end, "ignoring malformed preferred window");
                }
                resolved
            })
            .collect();

        Self {
            task,
            earliest_start: task.earliest_start.map(|dt| dt.with_timezone(&Utc)),
            deadline: task.deadline.map(|dt| dt.with_timezone(&Utc)),
            dependencies: task.dependencies.as_deref().unwrap_or_default(),
            preferred_windows,
        }
    }

    pub fn id(&self) -> &str {
        &self.task.id
    }

    pub fn title(&self) -> &str {
        &self.task.title
    }

    pub fn interruptible(&self) -> bool {
        self.task.interruptible
    }

    /// Effort still owed after completed work and already-locked blocks.
    pub fn remaining_minutes(&self, locked_minutes: i64) -> i64 {
        (self.task.estimated_minutes - self.task.completed_minutes - locked_minutes).max(0)
    }

    /// Smallest chunk worth placing. Non-interruptible work needs everything in one go; a
    /// remainder below `minBlockMinutes` is never placed.
    pub fn min_block_minutes(&self, remaining: i64) -> i64 {
        let floor = if self.task.interruptible {
            self.task.min_block_minutes
        } else {
            remaining
        };
        floor.max(1)
    }

    pub fn max_block_minutes(&self, remaining: i64) -> i64 {
        self.task.max_block_minutes.unwrap_or(remaining)
    }

    pub fn in_preferred_window(&self, tz: &Tz, instant: DateTime<Utc>) -> bool {
        self.preferred_windows
            .iter()
            .any(|window| window.contains(tz, instant))
    }
}
