use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};

/// Source of "now" for a planning run. Sampled once per run.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant; used for reproducible plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    pub fn from_rfc3339(value: &str) -> AppResult<Self> {
        let parsed = DateTime::parse_from_rfc3339(value.trim()).map_err(|err| {
            AppError::validation_with_source(format!("invalid instant \"{value}\""), err)
        })?;
        Ok(Self::new(parsed.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}
