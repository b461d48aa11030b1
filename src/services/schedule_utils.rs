use chrono::{offset::LocalResult, DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parses a 24-hour `HH:MM` string.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

pub fn parse_timezone(value: &str) -> Option<Tz> {
    value.trim().parse::<Tz>().ok()
}

pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn add_minutes(dt: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    dt + Duration::minutes(minutes)
}

pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    end.signed_duration_since(start).num_minutes()
}

/// Resolves a local wall-clock time on `date` to an instant. Ambiguous times (DST fall-back)
/// take the earlier instant; times skipped by a DST jump resolve to `None`.
pub fn local_instant(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, _) => Some(first.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

pub fn local_date(tz: &Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

pub fn to_fixed(tz: &Tz, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(tz).fixed_offset()
}
