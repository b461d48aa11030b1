use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::planning::{PlanWarning, PlannedBlock, WarningCode};
use crate::services::confidence;
use crate::services::free_slots::FreeSlotMap;
use crate::services::interval::make_interval;
use crate::services::schedule_utils;
use crate::services::settings_service::ResolvedSettings;
use crate::services::task_service::ResolvedTask;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationOutcome {
    pub blocks: Vec<PlannedBlock>,
    pub warnings: Vec<PlanWarning>,
}

/// Greedy placement over the horizon. Owns the free-slot working set and the per-day
/// totals for one run; tasks are fed in processing order.
pub struct BlockAllocator<'a> {
    settings: &'a ResolvedSettings,
    now: DateTime<Utc>,
    slots: FreeSlotMap,
    daily_totals: HashMap<NaiveDate, i64>,
    locked_minutes: HashMap<String, i64>,
    latest_end: HashMap<String, DateTime<Utc>>,
}

impl<'a> BlockAllocator<'a> {
    /// Locked blocks count against their task's remaining effort and their day's cap, and
    /// satisfy dependencies on their task.
    pub fn new(
        settings: &'a ResolvedSettings,
        now: DateTime<Utc>,
        slots: FreeSlotMap,
        locked_blocks: &[PlannedBlock],
    ) -> Self {
        let mut daily_totals: HashMap<NaiveDate, i64> = HashMap::new();
        let mut locked_minutes: HashMap<String, i64> = HashMap::new();
        let mut latest_end: HashMap<String, DateTime<Utc>> = HashMap::new();

        for block in locked_blocks {
            let Some(span) = make_interval(
                block.start.with_timezone(&Utc),
                block.end.with_timezone(&Utc),
            ) else {
                continue;
            };
            let minutes = span.minutes();
            *daily_totals
                .entry(settings.local_date(span.start))
                .or_insert(0) += minutes;
            *locked_minutes.entry(block.task_id.clone()).or_insert(0) += minutes;
            record_latest_end(&mut latest_end, &block.task_id, span.end);
        }

        Self {
            settings,
            now,
            slots,
            daily_totals,
            locked_minutes,
            latest_end,
        }
    }

    pub fn allocate_all<'t>(
        mut self,
        tasks: impl IntoIterator<Item = ResolvedTask<'t>>,
    ) -> AllocationOutcome {
        let mut outcome = AllocationOutcome::default();
        for task in tasks {
            let task_outcome = self.allocate(&task);
            outcome.blocks.extend(task_outcome.blocks);
            outcome.warnings.extend(task_outcome.warnings);
        }
        outcome
    }

    pub fn allocate(&mut self, task: &ResolvedTask<'_>) -> AllocationOutcome {
        let mut outcome = AllocationOutcome::default();

        let locked = self.locked_minutes.get(task.id()).copied().unwrap_or(0);
        let mut remaining = task.remaining_minutes(locked);
        if remaining == 0 {
            debug!(target: "app::planning", task_id = %task.id(), "nothing left to schedule");
            return outcome;
        }

        let earliest = self.earliest_start_for(task);
        if let Some(deadline) = task.deadline {
            if earliest > deadline {
                outcome.warnings.push(PlanWarning::for_task(
                    WarningCode::DeadlineAlreadyPassed,
                    task.id(),
                    format!(
                        "Task \"{}\" cannot start before its deadline {}; it was not scheduled.",
                        task.title(),
                        self.settings.to_local(deadline).to_rfc3339()
                    ),
                ));
                return outcome;
            }
        }

        let min_block = task.min_block_minutes(remaining);
        let max_block = task.max_block_minutes(remaining);
        let cap = self.settings.max_daily_minutes;
        let tz = self.settings.timezone;
        let mut first_block = true;

        for date in self.slots.dates() {
            if remaining == 0 {
                break;
            }
            let Some(day) = self.slots.day_mut(date) else {
                continue;
            };
            let Some(window) = day.window else {
                continue;
            };
            if window.end <= earliest {
                continue;
            }
            if task.deadline.is_some_and(|deadline| deadline < window.start) {
                break;
            }

            let planned_today = self.daily_totals.entry(date).or_insert(0);
            let mut index = 0;
            while index < day.slots.len() && remaining > 0 {
                let slot = day.slots[index];
                let clip_start = slot.start.max(earliest);
                let clip_end = task
                    .deadline
                    .map_or(slot.end, |deadline| slot.end.min(deadline));
                if clip_end <= clip_start {
                    index += 1;
                    continue;
                }

                let mut cursor = clip_start;
                loop {
                    let available = schedule_utils::duration_minutes(cursor, clip_end);
                    let daily_remaining = cap - *planned_today;
                    let can_fit = available
                        .min(daily_remaining)
                        .min(max_block)
                        .min(remaining);
                    if can_fit < min_block {
                        break;
                    }

                    let end = schedule_utils::add_minutes(cursor, can_fit);
                    let assessment = confidence::assess_block(task, &tz, cursor, first_block);
                    outcome.blocks.push(PlannedBlock {
                        id: block_id(task.id(), cursor, end),
                        task_id: task.id().to_string(),
                        start: self.settings.to_local(cursor),
                        end: self.settings.to_local(end),
                        confidence: assessment.confidence,
                        reason_codes: assessment.reason_codes,
                        locked: None,
                    });

                    *planned_today += can_fit;
                    remaining -= can_fit;
                    cursor = end;
                    first_block = false;

                    if !task.interruptible() {
                        remaining = 0;
                        break;
                    }
                    if remaining == 0
                        || schedule_utils::duration_minutes(cursor, clip_end) < min_block
                    {
                        break;
                    }
                }

                if cursor == clip_start {
                    index += 1;
                    continue;
                }

                // Whatever the task did not take stays free for the tasks after it.
                let leftovers: Vec<_> = [
                    make_interval(slot.start, clip_start),
                    make_interval(cursor, slot.end),
                ]
                .into_iter()
                .flatten()
                .collect();
                let kept = leftovers.len();
                day.slots.splice(index..=index, leftovers);
                index += kept;
            }
        }

        if let Some(last) = outcome.blocks.last() {
            record_latest_end(&mut self.latest_end, task.id(), last.end.with_timezone(&Utc));
        }

        if remaining > 0 {
            outcome.warnings.push(PlanWarning::for_task(
                WarningCode::InsufficientTime,
                task.id(),
                format!(
                    "Task \"{}\" still needs {} minutes that did not fit in the planning horizon.",
                    task.title(),
                    remaining
                ),
            ));
        }

        info!(
            target: "app::planning",
            task_id = %task.id(),
            blocks = outcome.blocks.len(),
            unscheduled_minutes = remaining,
            "task allocated"
        );

        outcome
    }

    /// The task's own earliest start (or now), pushed past any placed dependency blocks.
    fn earliest_start_for(&self, task: &ResolvedTask<'_>) -> DateTime<Utc> {
        let own = task.earliest_start.unwrap_or(self.now);
        task.dependencies
            .iter()
            .filter_map(|dependency| self.latest_end.get(dependency))
            .fold(own, |earliest, end| earliest.max(*end))
    }

    pub fn free_slots(&self) -> &FreeSlotMap {
        &self.slots
    }

    pub fn planned_minutes_on(&self, date: NaiveDate) -> i64 {
        self.daily_totals.get(&date).copied().unwrap_or(0)
    }
}

fn record_latest_end(
    latest_end: &mut HashMap<String, DateTime<Utc>>,
    task_id: &str,
    end: DateTime<Utc>,
) {
    latest_end
        .entry(task_id.to_string())
        .and_modify(|current| *current = (*current).max(end))
        .or_insert(end);
}

/// Stable across runs so identical inputs produce identical plans.
fn block_id(task_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let name = format!("{task_id}|{}|{}", start.to_rfc3339(), end.to_rfc3339());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}
