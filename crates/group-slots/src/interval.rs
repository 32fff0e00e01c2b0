//! Time intervals and the overlap primitives used by the slot finder.
//!
//! Three overlap tests live here:
//!
//! - [`Interval::conflicts_with`] is the inclusive-boundary test used when
//!   classifying candidate slots. A slot that merely touches a busy interval
//!   (one ends exactly when the other starts) counts as a conflict.
//! - [`Interval::touches`] is the closed-bound test used by stores to select
//!   busy records for a query window. It admits every record the inclusive
//!   test could flag, including ones that end exactly where the window starts.
//! - [`Interval::intersects`] is the strict half-open test behind
//!   [`OverlapRule::HalfOpen`].

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// A time range with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Build an interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(SlotError::InvalidInterval(format!(
                "end {} is not after start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds with [`parse_datetime`] and validate the pair.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_datetime(start)?, parse_datetime(end)?)
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// `start <= t <= end`.
    pub fn contains_inclusive(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    /// Inclusive conflict test between a candidate slot (`self`) and a busy
    /// interval.
    ///
    /// Registers a conflict when the slot's start lies within the busy
    /// interval, the slot's end lies within the busy interval, or the busy
    /// interval's start lies within the slot. All three bounds are inclusive,
    /// so `[10:00, 11:00)` conflicts with a busy `[09:00, 10:00)`.
    pub fn conflicts_with(&self, busy: &Interval) -> bool {
        busy.contains_inclusive(self.start)
            || busy.contains_inclusive(self.end)
            || self.contains_inclusive(busy.start)
    }

    /// Strict half-open intersection: adjacent intervals do not intersect.
    pub fn intersects(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Closed-bound overlap: adjacent intervals touch.
    ///
    /// Every pair that [`conflicts_with`](Self::conflicts_with) also touches,
    /// so stores select busy records with this test.
    pub fn touches(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The smallest interval covering both.
    pub fn span(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Which overlap test decides whether a busy interval blocks a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapRule {
    /// [`Interval::conflicts_with`]: touching boundaries conflict.
    #[default]
    Inclusive,
    /// [`Interval::intersects`]: back-to-back intervals do not conflict.
    HalfOpen,
}

impl OverlapRule {
    pub fn conflicts(&self, slot: &Interval, busy: &Interval) -> bool {
        match self {
            OverlapRule::Inclusive => slot.conflicts_with(busy),
            OverlapRule::HalfOpen => slot.intersects(busy),
        }
    }
}

impl FromStr for OverlapRule {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inclusive" => Ok(OverlapRule::Inclusive),
            "half-open" => Ok(OverlapRule::HalfOpen),
            other => Err(SlotError::InvalidOverlapRule(other.to_string())),
        }
    }
}

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (with offset, e.g. "2026-03-16T09:00:00+01:00") and naive
/// local time ("2026-03-16T09:00:00"), which is interpreted as UTC.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| SlotError::InvalidDatetime(format!("'{}': {}", s, e)))
}
