use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::models::calendar::CalendarEvent;
use crate::models::planning::PlannedBlock;
use crate::services::interval::{self, make_interval, Interval};
use crate::services::settings_service::ResolvedSettings;

/// One day of the horizon: its working window and the still-open parts of it.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub window: Option<Interval>,
    pub slots: Vec<Interval>,
}

impl DaySlots {
    pub fn free_minutes(&self) -> i64 {
        interval::total_minutes(&self.slots)
    }
}

/// Per-day free intervals. The allocator consumes these in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreeSlotMap {
    days: BTreeMap<NaiveDate, DaySlots>,
}

impl FreeSlotMap {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.keys().copied().collect()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DaySlots> {
        self.days.get(&date)
    }

    pub fn day_mut(&mut self, date: NaiveDate) -> Option<&mut DaySlots> {
        self.days.get_mut(&date)
    }

    pub fn slots(&self, date: NaiveDate) -> &[Interval] {
        self.days
            .get(&date)
            .map(|day| day.slots.as_slice())
            .unwrap_or_default()
    }

    pub fn total_free_minutes(&self) -> i64 {
        self.days.values().map(DaySlots::free_minutes).sum()
    }
}

/// Busy calendar events plus every locked block; both are off limits to allocation.
pub fn busy_intervals(events: &[CalendarEvent], locked_blocks: &[PlannedBlock]) -> Vec<Interval> {
    let from_events = events
        .iter()
        .filter(|event| event.busy)
        .filter_map(|event| {
            make_interval(event.start.with_timezone(&Utc), event.end.with_timezone(&Utc))
        });
    let from_locked = locked_blocks.iter().filter_map(|block| {
        make_interval(block.start.with_timezone(&Utc), block.end.with_timezone(&Utc))
    });
    from_events.chain(from_locked).collect()
}

pub fn build_free_slots(
    settings: &ResolvedSettings,
    today: NaiveDate,
    busy: &[Interval],
) -> FreeSlotMap {
    let mut days = BTreeMap::new();

    for date in settings.horizon_dates(today) {
        let window = settings.working_interval(date);
        let slots = match window {
            Some(working) => {
                let mut cuts = Vec::with_capacity(busy.len() + 1);
                if let Some(lunch) = settings.lunch_interval(date) {
                    cuts.push(lunch);
                }
                cuts.extend(busy.iter().filter_map(|interval| interval.clip(&working)));

                let mut free = interval::subtract_all(vec![working], &cuts);
                free.sort_by_key(|slot| slot.start);
                free
            }
            None => {
                debug!(target: "app::planning", %date, "no working interval for day");
                Vec::new()
            }
        };

        days.insert(
            date,
            DaySlots {
                date,
                window,
                slots,
            },
        );
    }

    FreeSlotMap { days }
}
