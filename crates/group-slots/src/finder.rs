//! Request-level slot search for a group.
//!
//! Resolves the group's members, fetches their busy intervals, builds the
//! candidate grid and evaluates it. Collaborator failures propagate unchanged
//! and no partial result is produced.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SlotError};
use crate::evaluator::{self, BusyEntry, MemberAvailability};
use crate::interval::{parse_datetime, Interval, OverlapRule};
use crate::ports::{BusyIntervalSource, BusyRecord, Member, MembershipResolver};
use crate::slots::{self, CandidateSlot, WorkingHours};

pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// A validated slot search over `[range.start, range.end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub group_id: String,
    pub range: Interval,
    pub duration_minutes: u32,
}

impl SlotRequest {
    /// # Errors
    /// `SlotError::InvalidRange` if `start >= end`, `SlotError::InvalidDuration`
    /// if `duration_minutes` is not positive.
    pub fn new(
        group_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<Self> {
        if group_id.trim().is_empty() {
            return Err(SlotError::MissingField("group_id"));
        }
        if start >= end {
            return Err(SlotError::InvalidRange(format!(
                "start {} is not before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self {
            group_id: group_id.to_string(),
            range: Interval { start, end },
            duration_minutes: positive_duration(duration_minutes)?,
        })
    }

    /// Build a request from raw strings; `duration_minutes` defaults to 60.
    pub fn parse(
        group_id: &str,
        start: &str,
        end: &str,
        duration_minutes: Option<i64>,
    ) -> Result<Self> {
        Self::new(
            group_id,
            parse_datetime(start)?,
            parse_datetime(end)?,
            duration_minutes.unwrap_or(i64::from(DEFAULT_DURATION_MINUTES)),
        )
    }
}

fn positive_duration(minutes: i64) -> Result<u32> {
    if minutes <= 0 {
        return Err(SlotError::InvalidDuration(minutes));
    }
    u32::try_from(minutes).map_err(|_| SlotError::InvalidDuration(minutes))
}

pub struct SlotFinder<M, B>
where
    M: MembershipResolver,
    B: BusyIntervalSource,
{
    members: Arc<M>,
    busy: Arc<B>,
    rule: OverlapRule,
}

impl<M, B> SlotFinder<M, B>
where
    M: MembershipResolver,
    B: BusyIntervalSource,
{
    pub fn new(members: Arc<M>, busy: Arc<B>) -> Self {
        Self {
            members,
            busy,
            rule: OverlapRule::default(),
        }
    }

    pub fn with_overlap_rule(mut self, rule: OverlapRule) -> Self {
        self.rule = rule;
        self
    }

    /// Available slots only, in grid order.
    pub async fn find_available_slots(
        &self,
        caller: &str,
        request: &SlotRequest,
    ) -> Result<Vec<Interval>> {
        let slots = self.evaluate(caller, request).await?;
        Ok(evaluator::available_intervals(&slots))
    }

    /// Every candidate slot of the request, annotated with conflicts.
    #[tracing::instrument(skip(self, request), fields(group_id = %request.group_id))]
    pub async fn evaluate(
        &self,
        caller: &str,
        request: &SlotRequest,
    ) -> Result<Vec<CandidateSlot>> {
        let grid = slots::generate_range(
            request.range.start,
            request.range.end,
            request.duration_minutes,
        );
        let window = fetch_window(request.range, &grid);
        let members = self.load_members(&request.group_id, caller, &window).await?;
        debug!(candidates = grid.len(), "evaluating slot grid");
        Ok(evaluator::evaluate_with(grid, &members, self.rule))
    }

    /// The single-day grid between `hours` in `tz`, annotated with conflicts.
    ///
    /// Busy intervals are fetched for the whole local day, widened to any slot
    /// that runs past midnight.
    #[tracing::instrument(skip(self))]
    pub async fn evaluate_day(
        &self,
        caller: &str,
        group_id: &str,
        date: NaiveDate,
        hours: WorkingHours,
        duration_minutes: i64,
        tz: Tz,
    ) -> Result<Vec<CandidateSlot>> {
        hours.validate()?;
        let duration_minutes = positive_duration(duration_minutes)?;

        let grid = slots::day_grid(date, hours, duration_minutes, tz)?;
        let window = fetch_window(slots::day_bounds(date, tz)?, &grid);
        let members = self.load_members(group_id, caller, &window).await?;
        debug!(candidates = grid.len(), "evaluating day grid");
        Ok(evaluator::evaluate_with(grid, &members, self.rule))
    }

    async fn load_members(
        &self,
        group_id: &str,
        caller: &str,
        window: &Interval,
    ) -> Result<Vec<MemberAvailability>> {
        let members = self.members.resolve_members(group_id, caller).await?;
        if members.is_empty() {
            debug!("group has no members, every slot is available");
            return Ok(Vec::new());
        }

        let user_ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
        let records = self.busy.fetch_busy_intervals(&user_ids, window).await?;
        debug!(members = members.len(), busy = records.len(), "loaded group availability");
        Ok(group_by_member(members, records))
    }
}

/// The span busy records must be fetched for: `range` widened to cover every
/// slot, since the last slot may end past `range.end`.
fn fetch_window(range: Interval, grid: &[CandidateSlot]) -> Interval {
    grid.iter().fold(range, |window, slot| window.span(&slot.interval))
}

/// Attach busy records to their members, keeping member order and record order.
/// Records of users outside `members` are dropped.
fn group_by_member(members: Vec<Member>, records: Vec<BusyRecord>) -> Vec<MemberAvailability> {
    let mut by_user: HashMap<String, Vec<BusyEntry>> = HashMap::new();
    for record in records {
        by_user.entry(record.user_id).or_default().push(BusyEntry {
            interval: record.interval,
            label: record.label,
        });
    }

    members
        .into_iter()
        .map(|member| MemberAvailability {
            busy: by_user.remove(&member.user_id).unwrap_or_default(),
            user_id: member.user_id,
            name: member.name,
            email: member.email,
        })
        .collect()
}
