use std::collections::HashSet;

use serde_json::{json, Value as JsonValue};

use crate::error::{AppError, AppResult};
use crate::models::planning::PlanRequest;
use crate::models::settings::Settings;
use crate::models::task::{Task, MIN_BLOCK_FLOOR_MINUTES};
use crate::services::schedule_utils;

/// Rejects requests that break the input contract. The engine itself never calls this;
/// it degrades gracefully instead.
pub fn validate_request(request: &PlanRequest) -> AppResult<()> {
    let mut issues = Vec::new();

    let mut seen_ids = HashSet::new();
    for task in &request.tasks {
        if !seen_ids.insert(task.id.as_str()) {
            issues.push(issue(&format!("tasks[{}].id", task.id), "duplicate task id"));
        }
        check_task(task, &mut issues);
    }

    check_settings(&request.settings, &mut issues);

    for event in &request.events {
        if event.start >= event.end {
            issues.push(issue(
                &format!("events[{}]", event.id),
                "event must start before it ends",
            ));
        }
    }
    for block in &request.locked_blocks {
        if block.start >= block.end {
            issues.push(issue(
                &format!("lockedBlocks[{}]", block.id),
                "locked block must start before it ends",
            ));
        }
    }

    if issues.is_empty() {
        return Ok(());
    }

    let message = format!("plan request has {} invalid field(s)", issues.len());
    Err(AppError::validation_with_details(
        message,
        json!({ "issues": issues }),
    ))
}

fn check_task(task: &Task, issues: &mut Vec<JsonValue>) {
    let field = |name: &str| format!("tasks[{}].{}", task.id, name);

    if task.id.trim().is_empty() {
        issues.push(issue("tasks[].id", "task id must not be empty"));
    }
    if task.min_block_minutes < MIN_BLOCK_FLOOR_MINUTES {
        issues.push(issue(
            &field("minBlockMinutes"),
            &format!("must be at least {MIN_BLOCK_FLOOR_MINUTES}"),
        ));
    }
    if task.estimated_minutes < task.min_block_minutes {
        issues.push(issue(
            &field("estimatedMinutes"),
            "must be at least minBlockMinutes",
        ));
    }
    if let Some(max) = task.max_block_minutes {
        if max < task.min_block_minutes {
            issues.push(issue(
                &field("maxBlockMinutes"),
                "must be at least minBlockMinutes",
            ));
        }
    }
    if task.completed_minutes < 0 || task.completed_minutes > task.estimated_minutes {
        issues.push(issue(
            &field("completedMinutes"),
            "must be between 0 and estimatedMinutes",
        ));
    }
    for (index, window) in task
        .preferred_time_windows
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
    {
        let start = schedule_utils::parse_clock_time(&window.start);
        let end = schedule_utils::parse_clock_time(&window.end);
        match (start, end) {
            (Some(start), Some(end)) if start < end => {}
            _ => issues.push(issue(
                &field(&format!("preferredTimeWindows[{index}]")),
                "window needs HH:MM start before end",
            )),
        }
    }
}

fn check_settings(settings: &Settings, issues: &mut Vec<JsonValue>) {
    if settings.planning_horizon_days < 1 {
        issues.push(issue("settings.planningHorizonDays", "must be at least 1"));
    }
    if settings.max_daily_minutes < 0 {
        issues.push(issue("settings.maxDailyMinutes", "must not be negative"));
    }
    if schedule_utils::parse_timezone(&settings.timezone).is_none() {
        issues.push(issue("settings.timezone", "unknown IANA timezone"));
    }

    let clock_fields = [
        ("settings.workDayStart", &settings.work_day_start),
        ("settings.workDayEnd", &settings.work_day_end),
        ("settings.lunchStart", &settings.lunch_start),
        ("settings.lunchEnd", &settings.lunch_end),
    ];
    for (name, value) in clock_fields {
        if schedule_utils::parse_clock_time(value).is_none() {
            issues.push(issue(name, "expected HH:MM"));
        }
    }
}

fn issue(field: &str, message: &str) -> JsonValue {
    json!({ "field": field, "message": message })
}
