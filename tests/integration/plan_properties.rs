use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use cognical_scheduler_lib::models::calendar::CalendarEvent;
use cognical_scheduler_lib::models::planning::{PlanResult, WarningCode};
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

fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("offset")
        .with_ymd_and_hms(2025, 5, day, hour, minute, 0)
        .single()
        .expect("valid datetime")
}

fn clock(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").expect("clock time")
}

fn workload() -> Vec<Task> {
    let mut report = Task::new("report", "Quarterly report", 240);
    report.deadline = Some(at(3, 17, 0));
    report.priority = 2;
    report.max_block_minutes = Some(120);

    let mut workshop = Task::new("workshop", "Workshop", 180);
    workshop.interruptible = false;
    workshop.priority = 5;

    let email = Task::new("email", "Email triage", 30);

    let mut research = Task::new("research", "Research spike", 1000);
    research.min_block_minutes = 60;

    let mut review = Task::new("review", "Review draft", 90);
    review.priority = 1;
    review.earliest_start = Some(at(2, 14, 0));
    review.dependencies = Some(vec!["report".into()]);

    let mut prep = Task::new("prep", "Interview prep", 120);
    prep.completed_minutes = 30;
    prep.preferred_time_windows = Some(vec![PreferredTimeWindow {
        days_of_week: vec![Weekday::Thu, Weekday::Fri],
        start: "09:00".into(),
        end: "12:00".into(),
    }]);

    vec![report, workshop, email, research, review, prep]
}

fn events() -> Vec<CalendarEvent> {
    vec![
        CalendarEvent::busy("sync", "Sync", at(1, 10, 0), at(1, 11, 0)),
        CalendarEvent::busy("offsite", "Offsite", at(2, 15, 0), at(2, 16, 30)),
        CalendarEvent {
            busy: false,
            ..CalendarEvent::busy("talk", "Optional talk", at(1, 14, 0), at(1, 15, 0))
        },
    ]
}

fn settings(timezone: &str) -> Settings {
    Settings {
        timezone: timezone.into(),
        planning_horizon_days: 5,
        max_daily_minutes: 300,
        ..Settings::default()
    }
}

fn plan(timezone: &str) -> PlanResult {
    frozen_service().generate_plan(&workload(), &events(), &settings(timezone), &[])
}

fn leftover_minutes(result: &PlanResult, task_id: &str) -> i64 {
    result
        .warnings_for_task(task_id)
        .filter(|warning| warning.code == WarningCode::InsufficientTime)
        .filter_map(|warning| {
            warning
                .message
                .split_whitespace()
                .find_map(|word| word.parse::<i64>().ok())
        })
        .sum()
}

#[test]
fn blocks_stay_inside_working_hours_and_avoid_lunch() {
    for timezone in ["UTC", "America/New_York", "Asia/Tokyo"] {
        let tz: Tz = timezone.parse().expect("timezone");
        let result = plan(timezone);
        assert!(!result.blocks.is_empty(), "{timezone}: no blocks");

        for block in &result.blocks {
            let start = block.start.with_timezone(&tz);
            let end = block.end.with_timezone(&tz);
            assert_eq!(start.date_naive(), end.date_naive(), "{timezone}: {block:?}");
            assert!(start.time() >= clock("09:00"), "{timezone}: {block:?}");
            assert!(end.time() <= clock("18:00"), "{timezone}: {block:?}");
            let clear_of_lunch = end.time() <= clock("12:00") || start.time() >= clock("13:00");
            assert!(clear_of_lunch, "{timezone}: {block:?}");
        }
    }
}

#[test]
fn daily_totals_respect_the_cap() {
    let result = plan("UTC");
    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for block in &result.blocks {
        *per_day.entry(block.start.date_naive()).or_insert(0) += block.duration_minutes();
    }
    assert!(per_day.values().all(|minutes| *minutes <= 300), "{per_day:?}");
    assert!(!result.has_warning(WarningCode::DailyCapExceeded));
}

#[test]
fn blocks_never_overlap_each_other_or_busy_events() {
    let result = plan("UTC");
    let mut spans: Vec<_> = result
        .blocks
        .iter()
        .map(|block| (block.start, block.end))
        .collect();
    spans.sort();
    for pair in spans.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "overlap: {pair:?}");
    }

    for block in &result.blocks {
        for event in events().iter().filter(|event| event.busy) {
            assert!(
                block.end <= event.start || block.start >= event.end,
                "{block:?} overlaps {}",
                event.id
            );
        }
    }
    assert!(!result.has_warning(WarningCode::BlockOverlap));
    assert!(!result.has_warning(WarningCode::OverlapsBusy));
    assert!(!result.has_warning(WarningCode::OutsideWorkHours));
}

#[test]
fn non_interruptible_task_gets_one_exact_block() {
    let result = plan("UTC");
    let blocks: Vec<_> = result.blocks_for_task("workshop").collect();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].duration_minutes(), 180);
}

#[test]
fn scheduled_plus_leftover_equals_remaining_effort() {
    let result = plan("UTC");
    for task in workload() {
        let remaining = task.estimated_minutes - task.completed_minutes;
        let scheduled = result.scheduled_minutes_for(&task.id);
        let leftover = leftover_minutes(&result, &task.id);
        assert_eq!(scheduled + leftover, remaining, "task {}", task.id);
    }
    assert!(leftover_minutes(&result, "research") > 0);
}

#[test]
fn chunks_respect_min_and_max_block_sizes() {
    let result = plan("UTC");
    for block in result.blocks_for_task("report") {
        assert!(block.duration_minutes() <= 120, "{block:?}");
        assert!(block.duration_minutes() >= 30, "{block:?}");
    }
    for block in result.blocks_for_task("research") {
        assert!(block.duration_minutes() >= 60, "{block:?}");
    }
}

#[test]
fn deadlines_and_earliest_starts_bound_placement() {
    let result = plan("UTC");
    assert!(result
        .blocks_for_task("report")
        .all(|block| block.end <= at(3, 17, 0)));
    assert!(result
        .blocks_for_task("review")
        .all(|block| block.start >= at(2, 14, 0)));

    let report_end = result
        .blocks_for_task("report")
        .map(|block| block.end)
        .max()
        .expect("report blocks");
    assert!(result
        .blocks_for_task("review")
        .all(|block| block.start >= report_end));
}

#[test]
fn confidence_stays_within_bounds() {
    let result = plan("UTC");
    for block in &result.blocks {
        assert!((0.2..=0.95).contains(&block.confidence), "{block:?}");
        assert_eq!(block.reason_codes.len(), 3);
    }
}
