//! Collaborator contracts the core reads from and writes to.
//!
//! Concrete stores (a relational database, the in-memory adapter in
//! [`crate::memory`]) implement these traits and are injected into
//! [`crate::finder::SlotFinder`] and [`crate::meetings::MeetingScheduler`] at
//! construction. Authorization of the caller against a group is the
//! resolver's job, not the core's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::interval::Interval;
use crate::meetings::{Meeting, NewMeeting, Participant, ParticipantStatus};

/// A group member as seen by the slot finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

/// A busy interval owned by a user, labelled with the event title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyRecord {
    pub user_id: String,
    pub interval: Interval,
    pub label: String,
}

#[async_trait]
pub trait MembershipResolver: Send + Sync {
    /// Members of `group_id` in join order.
    ///
    /// Fails with `StoreError::NotFound` if the group does not exist and with
    /// `StoreError::Forbidden` if `caller` is not one of its members.
    async fn resolve_members(&self, group_id: &str, caller: &str)
        -> Result<Vec<Member>, StoreError>;
}

#[async_trait]
pub trait BusyIntervalSource: Send + Sync {
    /// Busy records of `user_ids` overlapping or touching `range` (closed
    /// bounds, see [`Interval::touches`]), ordered by start.
    ///
    /// Returns an empty list when `user_ids` is empty.
    async fn fetch_busy_intervals(
        &self,
        user_ids: &[String],
        range: &Interval,
    ) -> Result<Vec<BusyRecord>, StoreError>;
}

#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn create_meeting(
        &self,
        draft: &NewMeeting,
        creator_id: &str,
    ) -> Result<Meeting, StoreError>;

    async fn meeting(&self, meeting_id: &str) -> Result<Meeting, StoreError>;

    /// Overwrite the stored meeting that has `meeting.id`.
    async fn update_meeting(&self, meeting: &Meeting) -> Result<Meeting, StoreError>;

    /// Delete a meeting together with its participant rows.
    async fn delete_meeting(&self, meeting_id: &str) -> Result<(), StoreError>;

    async fn meetings_for_group(&self, group_id: &str) -> Result<Vec<Meeting>, StoreError>;

    async fn participants(&self, meeting_id: &str) -> Result<Vec<Participant>, StoreError>;

    /// Insert a participant row, or overwrite the status of an existing one.
    async fn add_participant(
        &self,
        meeting_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> Result<(), StoreError>;

    /// Returns whether a row was removed.
    async fn remove_participant(&self, meeting_id: &str, user_id: &str)
        -> Result<bool, StoreError>;

    /// Fails with `StoreError::NotFound` if `user_id` is not a participant.
    async fn set_participant_status(
        &self,
        meeting_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> Result<(), StoreError>;
}
