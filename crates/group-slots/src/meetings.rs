//! Meeting scheduling with participant propagation.
//!
//! Creating a meeting adds every group member as a participant. A failure to
//! add one participant does not abort the meeting; it is reported back in
//! [`ScheduledMeeting::participant_failures`]. Only the creator may edit or
//! delete a meeting.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SlotError, StoreError};
use crate::interval::Interval;
use crate::ports::{MeetingStore, MembershipResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
}

impl FromStr for MeetingStatus {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(MeetingStatus::Scheduled),
            "cancelled" => Ok(MeetingStatus::Cancelled),
            "completed" => Ok(MeetingStatus::Completed),
            other => Err(SlotError::InvalidStatus(other.to_string())),
        }
    }
}

/// A participant's response to a meeting invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl ParticipantStatus {
    /// The creator starts out accepted, everyone else pending.
    pub fn initial_for(user_id: &str, creator_id: &str) -> Self {
        if user_id == creator_id {
            ParticipantStatus::Accepted
        } else {
            ParticipantStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Pending => "pending",
            ParticipantStatus::Accepted => "accepted",
            ParticipantStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantStatus {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ParticipantStatus::Pending),
            "accepted" => Ok(ParticipantStatus::Accepted),
            "declined" => Ok(ParticipantStatus::Declined),
            other => Err(SlotError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub status: ParticipantStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub interval: Interval,
    pub creator_id: String,
    pub status: MeetingStatus,
}

/// A meeting to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub group_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub interval: Interval,
}

impl NewMeeting {
    /// Build a draft from raw timestamps.
    ///
    /// # Errors
    /// `SlotError::MissingField` for an empty group or title,
    /// `SlotError::InvalidDatetime` / `SlotError::InvalidInterval` for bad times.
    pub fn parse(group_id: &str, title: &str, start: &str, end: &str) -> Result<Self> {
        let draft = Self {
            group_id: group_id.to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            interval: Interval::parse(start, end)?,
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> Result<()> {
        if self.group_id.trim().is_empty() {
            return Err(SlotError::MissingField("group_id"));
        }
        if self.title.trim().is_empty() {
            return Err(SlotError::MissingField("title"));
        }
        // Fields are public, so the interval may not have gone through Interval::new.
        Interval::new(self.interval.start, self.interval.end)?;
        Ok(())
    }
}

/// Edits to an existing meeting. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub interval: Option<Interval>,
    pub status: Option<MeetingStatus>,
}

impl MeetingChanges {
    pub fn status(status: MeetingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(SlotError::MissingField("title"));
            }
        }
        if let Some(interval) = &self.interval {
            Interval::new(interval.start, interval.end)?;
        }
        Ok(())
    }

    fn apply_to(self, meeting: &mut Meeting) {
        if let Some(title) = self.title {
            meeting.title = title;
        }
        if let Some(description) = self.description {
            meeting.description = Some(description);
        }
        if let Some(location) = self.location {
            meeting.location = Some(location);
        }
        if let Some(interval) = self.interval {
            meeting.interval = interval;
        }
        if let Some(status) = self.status {
            meeting.status = status;
        }
    }
}

/// A participant row that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantFailure {
    pub user_id: String,
    pub error: StoreError,
}

/// Outcome of [`MeetingScheduler::schedule`]: the meeting always exists, some
/// participants may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMeeting {
    pub meeting: Meeting,
    pub participant_failures: Vec<ParticipantFailure>,
}

impl ScheduledMeeting {
    pub fn is_complete(&self) -> bool {
        self.participant_failures.is_empty()
    }
}

pub struct MeetingScheduler<M, S>
where
    M: MembershipResolver,
    S: MeetingStore,
{
    members: Arc<M>,
    meetings: Arc<S>,
}

impl<M, S> MeetingScheduler<M, S>
where
    M: MembershipResolver,
    S: MeetingStore,
{
    pub fn new(members: Arc<M>, meetings: Arc<S>) -> Self {
        Self { members, meetings }
    }

    /// Create a meeting in a group the caller belongs to and invite every
    /// member.
    #[tracing::instrument(skip(self, draft), fields(group_id = %draft.group_id))]
    pub async fn schedule(&self, caller: &str, draft: NewMeeting) -> Result<ScheduledMeeting> {
        draft.validate()?;

        let members = self
            .members
            .resolve_members(&draft.group_id, caller)
            .await?;
        let meeting = self.meetings.create_meeting(&draft, caller).await?;
        debug!(meeting_id = %meeting.id, members = members.len(), "meeting created");

        let mut participant_failures = Vec::new();
        for member in &members {
            let status = ParticipantStatus::initial_for(&member.user_id, caller);
            if let Err(error) = self
                .meetings
                .add_participant(&meeting.id, &member.user_id, status)
                .await
            {
                warn!(
                    meeting_id = %meeting.id,
                    user_id = %member.user_id,
                    %error,
                    "failed to add participant"
                );
                participant_failures.push(ParticipantFailure {
                    user_id: member.user_id.clone(),
                    error,
                });
            }
        }

        Ok(ScheduledMeeting {
            meeting,
            participant_failures,
        })
    }

    /// Edit a meeting. Only its creator may do this.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update(
        &self,
        caller: &str,
        meeting_id: &str,
        changes: MeetingChanges,
    ) -> Result<Meeting> {
        changes.validate()?;

        let mut meeting = self.owned_meeting(caller, meeting_id).await?;
        changes.apply_to(&mut meeting);
        let meeting = self.meetings.update_meeting(&meeting).await?;
        debug!(status = ?meeting.status, "meeting updated");
        Ok(meeting)
    }

    /// Mark a meeting cancelled, keeping it and its participants.
    pub async fn cancel(&self, caller: &str, meeting_id: &str) -> Result<Meeting> {
        self.update(
            caller,
            meeting_id,
            MeetingChanges::status(MeetingStatus::Cancelled),
        )
        .await
    }

    /// Delete a meeting and its participant rows. Only its creator may do this.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, caller: &str, meeting_id: &str) -> Result<()> {
        self.owned_meeting(caller, meeting_id).await?;
        self.meetings.delete_meeting(meeting_id).await?;
        debug!("meeting deleted");
        Ok(())
    }

    async fn owned_meeting(&self, caller: &str, meeting_id: &str) -> Result<Meeting> {
        let meeting = self.meetings.meeting(meeting_id).await?;
        if meeting.creator_id != caller {
            return Err(StoreError::Forbidden(format!(
                "only the creator of meeting {} may change it",
                meeting_id
            ))
            .into());
        }
        Ok(meeting)
    }

    /// Record the caller's response to a meeting.
    #[tracing::instrument(skip(self))]
    pub async fn respond(
        &self,
        caller: &str,
        meeting_id: &str,
        status: ParticipantStatus,
    ) -> Result<Participant> {
        self.meetings.meeting(meeting_id).await?;
        self.meetings
            .set_participant_status(meeting_id, caller, status)
            .await?;
        Ok(Participant {
            user_id: caller.to_string(),
            status,
        })
    }
}
