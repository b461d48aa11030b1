use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// An existing calendar entry. Only `busy` events block allocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default = "default_busy")]
    pub busy: bool,
}

impl CalendarEvent {
    pub fn busy(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end,
            busy: true,
        }
    }
}

fn default_busy() -> bool {
    true
}
