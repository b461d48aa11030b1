use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::models::planning::ReasonCode;
use crate::services::task_service::ResolvedTask;

const BASE_CONFIDENCE: f64 = 0.6;
const PREFERRED_WINDOW_BONUS: f64 = 0.2;
const NEAR_DEADLINE_BONUS: f64 = 0.1;
const FIRST_BLOCK_BONUS: f64 = 0.05;
const MIN_CONFIDENCE: f64 = 0.2;
const MAX_CONFIDENCE: f64 = 0.95;
const NEAR_DEADLINE_HOURS: i64 = 48;

#[derive(Debug, Clone, PartialEq)]
pub struct BlockAssessment {
    pub confidence: f64,
    pub reason_codes: Vec<ReasonCode>,
}

/// Scores a block starting at `start` and tags why it landed there.
pub fn assess_block(
    task: &ResolvedTask<'_>,
    tz: &Tz,
    start: DateTime<Utc>,
    first_block: bool,
) -> BlockAssessment {
    let preferred = task.in_preferred_window(tz, start);
    let near_deadline = task
        .deadline
        .is_some_and(|deadline| is_near_deadline(start, deadline));

    let mut confidence = BASE_CONFIDENCE;
    if preferred {
        confidence += PREFERRED_WINDOW_BONUS;
    }
    if near_deadline {
        confidence += NEAR_DEADLINE_BONUS;
    }
    if first_block {
        confidence += FIRST_BLOCK_BONUS;
    }

    let reason_codes = vec![
        if first_block {
            ReasonCode::FirstAvailable
        } else {
            ReasonCode::Chunked
        },
        if preferred {
            ReasonCode::PreferredWindow
        } else {
            ReasonCode::EarliestSlot
        },
        if near_deadline {
            ReasonCode::NearDeadline
        } else {
            ReasonCode::NormalBuffer
        },
    ];

    BlockAssessment {
        confidence: round_confidence(confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)),
        reason_codes,
    }
}

fn is_near_deadline(start: DateTime<Utc>, deadline: DateTime<Utc>) -> bool {
    start <= deadline && deadline - start <= Duration::hours(NEAR_DEADLINE_HOURS)
}

fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
