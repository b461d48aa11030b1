use chrono::{DateTime, Utc};

use crate::services::schedule_utils;

/// Half-open time range `[start, end)`; construction guarantees `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        make_interval(start, end)
    }

    pub fn minutes(&self) -> i64 {
        schedule_utils::duration_minutes(self.start, self.end)
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self, other)
    }

    /// Part of `self` that lies inside `bounds`.
    pub fn clip(&self, bounds: &Interval) -> Option<Interval> {
        make_interval(self.start.max(bounds.start), self.end.min(bounds.end))
    }

    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// `None` stands in for a degenerate (empty or inverted) range.
pub fn make_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Interval> {
    (end > start).then_some(Interval { start, end })
}

/// Touching endpoints do not overlap.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && b.start < a.end
}

pub fn subtract(base: &Interval, cut: &Interval) -> Vec<Interval> {
    if !overlaps(base, cut) {
        return vec![*base];
    }

    let mut remaining = Vec::with_capacity(2);
    if let Some(left) = make_interval(base.start, cut.start) {
        remaining.push(left);
    }
    if let Some(right) = make_interval(cut.end, base.end) {
        remaining.push(right);
    }
    remaining
}

/// Applies every cut, in order, to the current set of fragments.
pub fn subtract_all(bases: Vec<Interval>, cuts: &[Interval]) -> Vec<Interval> {
    cuts.iter().fold(bases, |fragments, cut| {
        fragments
            .iter()
            .flat_map(|fragment| subtract(fragment, cut))
            .collect()
    })
}

pub fn total_minutes(intervals: &[Interval]) -> i64 {
    intervals.iter().map(Interval::minutes).sum()
}
