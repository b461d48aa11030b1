use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::models::calendar::CalendarEvent;
use crate::models::planning::{PlanWarning, PlannedBlock, WarningCode};
use crate::services::interval::{make_interval, overlaps, Interval};
use crate::services::settings_service::ResolvedSettings;

/// Post-hoc sweep over the final block set. Never mutates the plan.
pub fn validate_plan(
    blocks: &[PlannedBlock],
    events: &[CalendarEvent],
    settings: &ResolvedSettings,
) -> Vec<PlanWarning> {
    let spans: Vec<(&PlannedBlock, Interval)> = blocks
        .iter()
        .filter_map(|block| {
            make_interval(
                block.start.with_timezone(&Utc),
                block.end.with_timezone(&Utc),
            )
            .map(|span| (block, span))
        })
        .collect();

    let mut warnings = Vec::new();
    warnings.extend(check_work_hours(&spans, settings));
    warnings.extend(check_busy_overlaps(&spans, events));
    warnings.extend(check_block_overlaps(&spans));
    warnings.extend(check_daily_caps(&spans, settings));

    debug!(target: "app::planning", blocks = blocks.len(), warnings = warnings.len(), "plan validated");
    warnings
}

fn check_work_hours(
    spans: &[(&PlannedBlock, Interval)],
    settings: &ResolvedSettings,
) -> Vec<PlanWarning> {
    spans
        .iter()
        .filter(|(_, span)| {
            let date = settings.local_date(span.start);
            !settings
                .working_interval(date)
                .is_some_and(|working| working.contains(span))
        })
        .map(|(block, _)| {
            PlanWarning::for_task(
                WarningCode::OutsideWorkHours,
                &block.task_id,
                format!(
                    "Block {} ({} - {}) falls outside working hours.",
                    block.id,
                    block.start.to_rfc3339(),
                    block.end.to_rfc3339()
                ),
            )
        })
        .collect()
}

fn check_busy_overlaps(
    spans: &[(&PlannedBlock, Interval)],
    events: &[CalendarEvent],
) -> Vec<PlanWarning> {
    let busy: Vec<(&CalendarEvent, Interval)> = events
        .iter()
        .filter(|event| event.busy)
        .filter_map(|event| {
            make_interval(
                event.start.with_timezone(&Utc),
                event.end.with_timezone(&Utc),
            )
            .map(|span| (event, span))
        })
        .collect();

    let mut warnings = Vec::new();
    for (block, span) in spans {
        for (event, event_span) in &busy {
            if overlaps(span, event_span) {
                warnings.push(PlanWarning::for_task(
                    WarningCode::OverlapsBusy,
                    &block.task_id,
                    format!(
                        "Block {} overlaps busy event \"{}\" ({}).",
                        block.id, event.title, event.id
                    ),
                ));
            }
        }
    }
    warnings
}

fn check_block_overlaps(spans: &[(&PlannedBlock, Interval)]) -> Vec<PlanWarning> {
    let mut sorted: Vec<&(&PlannedBlock, Interval)> = spans.iter().collect();
    sorted.sort_by(|a, b| {
        a.1.start
            .cmp(&b.1.start)
            .then_with(|| a.1.end.cmp(&b.1.end))
            .then_with(|| a.0.id.cmp(&b.0.id))
    });

    let mut warnings = Vec::new();
    for (position, (block, span)) in sorted.iter().enumerate() {
        for (other, other_span) in sorted[position + 1..].iter() {
            if other_span.start >= span.end {
                break;
            }
            warnings.push(PlanWarning::for_task(
                WarningCode::BlockOverlap,
                &other.task_id,
                format!("Block {} overlaps block {}.", other.id, block.id),
            ));
        }
    }
    warnings
}

fn check_daily_caps(
    spans: &[(&PlannedBlock, Interval)],
    settings: &ResolvedSettings,
) -> Vec<PlanWarning> {
    let mut totals: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (_, span) in spans {
        *totals.entry(settings.local_date(span.start)).or_insert(0) += span.minutes();
    }

    totals
        .into_iter()
        .filter(|(_, minutes)| *minutes > settings.max_daily_minutes)
        .map(|(date, minutes)| {
            PlanWarning::new(
                WarningCode::DailyCapExceeded,
                format!(
                    "{} has {} planned minutes, above the daily limit of {}.",
                    date, minutes, settings.max_daily_minutes
                ),
            )
        })
        .collect()
}
