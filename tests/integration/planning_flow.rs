use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use cognical_scheduler_lib::models::calendar::CalendarEvent;
use cognical_scheduler_lib::models::planning::{
    DependencyMode, PlanRequest, PlannerOptions, ReasonCode, WarningCode,
};
use cognical_scheduler_lib::models::settings::Settings;
use cognical_scheduler_lib::models::task::{PreferredTimeWindow, Task};
use cognical_scheduler_lib::services::planning_service::PlanningService;
use cognical_scheduler_lib::utils::clock::FixedClock;

fn frozen_service() -> PlanningService<FixedClock> {
    PlanningService::with_clock(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0)
            .single()
            .expect("frozen now"),
    ))
}

fn utc(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("offset")
        .with_ymd_and_hms(2025, 5, day, hour, minute, 0)
        .single()
        .expect("valid datetime")
}

fn one_day() -> Settings {
    Settings {
        work_day_start: "09:00".into(),
        work_day_end: "18:00".into(),
        lunch_start: "12:00".into(),
        lunch_end: "13:00".into(),
        max_daily_minutes: 360,
        planning_horizon_days: 1,
        ..Settings::default()
    }
}

#[test]
fn single_task_lands_at_start_of_day() {
    let mut task = Task::new("t-1", "Write summary", 90);
    task.priority = 3;

    let result = frozen_service().generate_plan(&[task], &[], &one_day(), &[]);

    assert!(result.warnings.is_empty(), "unexpected warnings: {:?}", result.warnings);
    assert_eq!(result.blocks.len(), 1);
    let block = &result.blocks[0];
    assert_eq!(block.start, utc(1, 9, 0));
    assert_eq!(block.end, utc(1, 10, 30));
    assert_eq!(block.confidence, 0.65);
    assert_eq!(
        block.reason_codes,
        vec![
            ReasonCode::FirstAvailable,
            ReasonCode::EarliestSlot,
            ReasonCode::NormalBuffer
        ]
    );
    assert!(!block.is_locked());
}

#[test]
fn oversized_task_fills_daily_cap_and_reports_leftover() {
    let task = Task::new("t-1", "Quarterly report", 600);

    let result = frozen_service().generate_plan(&[task], &[], &one_day(), &[]);

    assert_eq!(result.scheduled_minutes_for("t-1"), 360);
    let warnings: Vec<_> = result.warnings_for_task("t-1").collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, WarningCode::InsufficientTime);
    assert!(warnings[0].message.contains("240 minutes"));
}

#[test]
fn passed_deadline_is_reported_not_scheduled() {
    let mut late = Task::new("late", "Expense report", 60);
    late.deadline = Some(utc(1, 7, 0));
    let on_time = Task::new("on-time", "Inbox zero", 30);

    let result = frozen_service().generate_plan(&[late, on_time], &[], &one_day(), &[]);

    assert_eq!(result.blocks_for_task("late").count(), 0);
    let warnings: Vec<_> = result.warnings_for_task("late").collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, WarningCode::DeadlineAlreadyPassed);
    assert_eq!(result.scheduled_minutes_for("on-time"), 30);
}

#[test]
fn busy_events_and_lunch_shape_the_plan() {
    let events = vec![
        CalendarEvent::busy("standup", "Standup", utc(1, 9, 0), utc(1, 9, 30)),
        CalendarEvent::busy("1on1", "1:1", utc(1, 10, 30), utc(1, 11, 0)),
    ];
    let task = Task::new("t-1", "Deep work", 150);

    let result = frozen_service().generate_plan(&[task], &events, &one_day(), &[]);

    let spans: Vec<_> = result
        .blocks
        .iter()
        .map(|block| (block.start, block.end))
        .collect();
    assert_eq!(
        spans,
        vec![
            (utc(1, 9, 30), utc(1, 10, 30)),
            (utc(1, 11, 0), utc(1, 12, 0)),
            (utc(1, 13, 0), utc(1, 13, 30)),
        ]
    );
    assert_eq!(result.blocks[1].reason_codes[0], ReasonCode::Chunked);
    assert!(result.warnings.is_empty());
}

#[test]
fn local_timezone_drives_working_hours() {
    let settings = Settings {
        timezone: "Europe/Berlin".into(),
        ..one_day()
    };
    let task = Task::new("t-1", "Call prep", 60);

    let result = frozen_service().generate_plan(&[task], &[], &settings, &[]);

    // 08:00 UTC is 10:00 in Berlin, so the morning before now is skipped.
    assert_eq!(result.blocks.len(), 1);
    assert_eq!(
        result.blocks[0].start.to_rfc3339(),
        "2025-05-01T10:00:00+02:00"
    );
    assert_eq!(result.generated_at.to_rfc3339(), "2025-05-01T10:00:00+02:00");
    assert!(result
        .assumptions
        .iter()
        .any(|note| note.contains("Europe/Berlin")));
}

#[test]
fn preferred_window_raises_confidence() {
    let mut task = Task::new("t-1", "Writing", 60);
    task.earliest_start = Some(utc(1, 14, 0));
    task.preferred_time_windows = Some(vec![PreferredTimeWindow {
        days_of_week: vec![chrono::Weekday::Thu],
        start: "14:00".into(),
        end: "16:00".into(),
    }]);

    let result = frozen_service().generate_plan(&[task], &[], &one_day(), &[]);

    assert_eq!(result.blocks[0].start, utc(1, 14, 0));
    assert_eq!(result.blocks[0].confidence, 0.85);
    assert!(result.blocks[0]
        .reason_codes
        .contains(&ReasonCode::PreferredWindow));
}

#[test]
fn dependency_modes_differ_when_dependent_sorts_first() {
    let mut write = Task::new("write", "Write article", 60);
    write.deadline = Some(utc(1, 17, 0));
    write.dependencies = Some(vec!["research".into()]);
    let research = Task::new("research", "Research", 60);

    let mut request = PlanRequest {
        tasks: vec![write, research],
        settings: one_day(),
        ..PlanRequest::default()
    };

    let best_effort = frozen_service().generate(&request);
    let write_block = best_effort
        .blocks_for_task("write")
        .next()
        .expect("write block");
    assert_eq!(write_block.start, utc(1, 9, 0));

    request.options = PlannerOptions {
        dependency_mode: DependencyMode::Topological,
    };
    let topological = frozen_service().generate(&request);
    let research_block = topological
        .blocks_for_task("research")
        .next()
        .expect("research block");
    let write_block = topological
        .blocks_for_task("write")
        .next()
        .expect("write block");
    assert_eq!(research_block.start, utc(1, 9, 0));
    assert_eq!(write_block.start, research_block.end);
}

#[test]
fn remainder_shorter_than_min_block_is_left_unscheduled() {
    let mut task = Task::new("t-1", "Wrap up", 60);
    task.completed_minutes = 40;

    let result = frozen_service().generate_plan(&[task], &[], &one_day(), &[]);

    assert!(result.blocks.is_empty());
    let warnings: Vec<_> = result.warnings_for_task("t-1").collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, WarningCode::InsufficientTime);
    assert!(warnings[0].message.contains("20 minutes"));
}
