//! Candidate slot generation.
//!
//! Candidate start times advance on a fixed one-hour cadence regardless of the
//! requested slot duration. With a duration above 60 minutes consecutive slots
//! overlap; below 60 minutes they leave gaps.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::interval::Interval;

/// Step between consecutive candidate start times.
pub const SLOT_CADENCE_MINUTES: i64 = 60;

/// A member's busy interval overlapping a candidate slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConflict {
    pub user_id: String,
    pub member_name: String,
    pub label: String,
}

impl fmt::Display for SlotConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.member_name, self.label)
    }
}

/// A candidate time slot, annotated with availability once evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub interval: Interval,
    pub available: bool,
    pub conflicts: Vec<SlotConflict>,
}

impl CandidateSlot {
    /// A fresh slot: available, no conflicts.
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            available: true,
            conflicts: Vec::new(),
        }
    }
}

/// Start and end of the working day, as whole local hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 18,
        }
    }
}

impl WorkingHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self> {
        let hours = Self {
            start_hour,
            end_hour,
        };
        hours.validate()?;
        Ok(hours)
    }

    /// Reject `start_hour >= end_hour` and hours past midnight.
    pub fn validate(&self) -> Result<()> {
        if self.end_hour > 24 {
            return Err(SlotError::InvalidHours(format!(
                "end hour {} is past 24",
                self.end_hour
            )));
        }
        if self.start_hour >= self.end_hour {
            return Err(SlotError::InvalidHours(format!(
                "start hour {} is not before end hour {}",
                self.start_hour, self.end_hour
            )));
        }
        Ok(())
    }
}

/// Enumerate candidate slots `[t, t + duration)` for `t = start, start + 1h, ...`
/// while `t + 1h <= end`.
///
/// Returns an empty grid when `start >= end` or `duration_minutes == 0`.
pub fn generate_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    duration_minutes: u32,
) -> Vec<CandidateSlot> {
    if start >= end || duration_minutes == 0 {
        return Vec::new();
    }

    let cadence = Duration::minutes(SLOT_CADENCE_MINUTES);
    let duration = Duration::minutes(i64::from(duration_minutes));

    let mut slots = Vec::new();
    let mut cursor = start;
    while cursor + cadence <= end {
        slots.push(CandidateSlot::new(Interval {
            start: cursor,
            end: cursor + duration,
        }));
        cursor += cadence;
    }
    slots
}

/// Candidate grid for a single calendar day in the given timezone.
///
/// `H0:00` and `H1:00` are interpreted as wall-clock times on `date` in `tz`.
/// An empty grid is returned when `start_hour >= end_hour`.
///
/// # Errors
/// Returns `SlotError::InvalidHours` if `end_hour > 24`, and
/// `SlotError::InvalidDatetime` if a bound falls into a DST gap.
pub fn day_grid(
    date: NaiveDate,
    hours: WorkingHours,
    duration_minutes: u32,
    tz: Tz,
) -> Result<Vec<CandidateSlot>> {
    if hours.end_hour > 24 {
        return Err(SlotError::InvalidHours(format!(
            "end hour {} is past 24",
            hours.end_hour
        )));
    }
    if hours.start_hour >= hours.end_hour {
        return Ok(Vec::new());
    }

    let start = localize(date, hours.start_hour, tz)?;
    let end = localize(date, hours.end_hour, tz)?;
    Ok(generate_range(start, end, duration_minutes))
}

/// The whole local day `[00:00, 24:00)` of `date` in `tz`, in UTC.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> Result<Interval> {
    Interval::new(localize(date, 0, tz)?, localize(date, 24, tz)?)
}

/// Resolve `hour:00` on `date` in `tz` to UTC. Hour 24 is midnight of the next day.
fn localize(date: NaiveDate, hour: u32, tz: Tz) -> Result<DateTime<Utc>> {
    let (day, hour) = if hour == 24 {
        let next = date
            .succ_opt()
            .ok_or_else(|| SlotError::InvalidDatetime(format!("no day after {}", date)))?;
        (next, 0)
    } else {
        (date, hour)
    };

    let naive = day
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| SlotError::InvalidHours(format!("hour {} out of range", hour)))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            SlotError::InvalidDatetime(format!("{} does not exist in {}", naive, tz.name()))
        })
}
