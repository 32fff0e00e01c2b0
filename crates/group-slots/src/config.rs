//! Scheduling defaults shared by callers of the finder.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::finder::DEFAULT_DURATION_MINUTES;
use crate::interval::OverlapRule;
use crate::slots::WorkingHours;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Bounds of the single-day grid.
    pub working_hours: WorkingHours,
    /// Slot length used when a request does not give one.
    pub default_duration_minutes: u32,
    /// IANA timezone the working hours are expressed in.
    pub timezone: String,
    pub overlap_rule: OverlapRule,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            working_hours: WorkingHours::default(),
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            timezone: "UTC".to_string(),
            overlap_rule: OverlapRule::default(),
        }
    }
}

impl SchedulingConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| SlotError::InvalidTimezone(self.timezone.clone()))
    }

    pub fn validate(&self) -> Result<()> {
        self.working_hours.validate()?;
        if self.default_duration_minutes == 0 {
            return Err(SlotError::InvalidDuration(0));
        }
        self.tz()?;
        Ok(())
    }
}
