use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::models::settings::Settings;
use crate::services::interval::{make_interval, Interval};
use crate::services::schedule_utils;

const MIN_HORIZON_DAYS: u32 = 1;

/// `Settings` with every field parsed once. Unparseable clock times become `None`, which
/// later degrades to "no interval" rather than an error.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub timezone: Tz,
    pub horizon_days: u32,
    pub work_day_start: Option<NaiveTime>,
    pub work_day_end: Option<NaiveTime>,
    pub lunch_start: Option<NaiveTime>,
    pub lunch_end: Option<NaiveTime>,
    pub max_daily_minutes: i64,
    /// Fallbacks applied while resolving, surfaced as plan assumptions.
    pub notes: Vec<String>,
}

impl ResolvedSettings {
    pub fn resolve(settings: &Settings) -> Self {
        let mut notes = Vec::new();

        let timezone = match schedule_utils::parse_timezone(&settings.timezone) {
            Some(tz) => tz,
            None => {
                warn!(target: "app::settings", timezone = %settings.timezone, "unknown timezone, falling back to UTC");
                notes.push(format!(
                    "Unknown timezone \"{}\"; working hours were interpreted in UTC.",
                    settings.timezone
                ));
                Tz::UTC
            }
        };

        let horizon_days = if settings.planning_horizon_days < MIN_HORIZON_DAYS {
            warn!(target: "app::settings", horizon = settings.planning_horizon_days, "planning horizon below one day, using one day");
            notes.push("Planning horizon was raised to 1 day.".to_string());
            MIN_HORIZON_DAYS
        } else {
            settings.planning_horizon_days
        };

        let max_daily_minutes = settings.max_daily_minutes.max(0);

        Self {
            timezone,
            horizon_days,
            work_day_start: resolve_clock_field("workDayStart", &settings.work_day_start),
            work_day_end: resolve_clock_field("workDayEnd", &settings.work_day_end),
            lunch_start: resolve_clock_field("lunchStart", &settings.lunch_start),
            lunch_end: resolve_clock_field("lunchEnd", &settings.lunch_end),
            max_daily_minutes,
            notes,
        }
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        schedule_utils::local_date(&self.timezone, instant)
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        schedule_utils::to_fixed(&self.timezone, instant)
    }

    /// `[today, today + horizon)` in local dates.
    pub fn horizon_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        (0..self.horizon_days as i64)
            .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
            .collect()
    }

    pub fn working_interval(&self, date: NaiveDate) -> Option<Interval> {
        self.local_interval(date, self.work_day_start, self.work_day_end)
    }

    pub fn lunch_interval(&self, date: NaiveDate) -> Option<Interval> {
        self.local_interval(date, self.lunch_start, self.lunch_end)
    }

    fn local_interval(
        &self,
        date: NaiveDate,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Option<Interval> {
        let start = schedule_utils::local_instant(&self.timezone, date, start?)?;
        let end = schedule_utils::local_instant(&self.timezone, date, end?)?;
        make_interval(start, end)
    }

    /// Human-readable baseline the plan was built under.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match (self.work_day_start, self.work_day_end) {
            (Some(start), Some(end)) if start < end => lines.push(format!(
                "Working hours {}-{} ({}).",
                schedule_utils::format_clock_time(start),
                schedule_utils::format_clock_time(end),
                self.timezone.name()
            )),
            _ => lines.push("Working hours are not configured; nothing was scheduled.".to_string()),
        }
        if let (Some(start), Some(end)) = (self.lunch_start, self.lunch_end) {
            if start < end {
                lines.push(format!(
                    "Lunch {}-{} is kept free.",
                    schedule_utils::format_clock_time(start),
                    schedule_utils::format_clock_time(end)
                ));
            }
        }
        lines.push(format!(
            "At most {} minutes are planned per day over {} day(s).",
            self.max_daily_minutes, self.horizon_days
        ));
        lines
    }
}

fn resolve_clock_field(field: &str, value: &str) -> Option<NaiveTime> {
    let parsed = schedule_utils::parse_clock_time(value);
    if parsed.is_none() {
        warn!(target: "app::settings", field, value, "invalid HH:MM value, treating interval as empty");
    }
    parsed
}
