//! Group membership changes as explicit events, and the projector that keeps
//! meeting participants in step with them.
//!
//! A store that adds or removes a member emits a [`MembershipEvent`]; the
//! [`ParticipantProjector`] turns it into participant writes and reports what
//! it touched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::meetings::ParticipantStatus;
use crate::ports::MeetingStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MembershipEvent {
    MemberAdded { group_id: String, user_id: String },
    MemberRemoved { group_id: String, user_id: String },
}

impl MembershipEvent {
    pub fn group_id(&self) -> &str {
        match self {
            MembershipEvent::MemberAdded { group_id, .. }
            | MembershipEvent::MemberRemoved { group_id, .. } => group_id,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            MembershipEvent::MemberAdded { user_id, .. }
            | MembershipEvent::MemberRemoved { user_id, .. } => user_id,
        }
    }
}

/// What a projector run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    /// Meetings whose participant list was modified.
    pub touched: Vec<String>,
    /// Meetings already in the desired state.
    pub unchanged: Vec<String>,
    /// Meetings whose participant write failed.
    pub failures: Vec<(String, StoreError)>,
}

pub struct ParticipantProjector<S: MeetingStore> {
    store: Arc<S>,
}

impl<S: MeetingStore> ParticipantProjector<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Apply one membership event to every meeting of its group.
    ///
    /// Listing the group's meetings is the only fatal step; per-meeting write
    /// failures are collected in the report.
    #[tracing::instrument(
        skip(self),
        fields(group_id = %event.group_id(), user_id = %event.user_id())
    )]
    pub async fn apply(&self, event: &MembershipEvent) -> Result<ProjectionReport> {
        let meetings = self.store.meetings_for_group(event.group_id()).await?;
        let mut report = ProjectionReport::default();

        for meeting in &meetings {
            let outcome = match event {
                MembershipEvent::MemberAdded { user_id, .. } => {
                    self.add_if_missing(&meeting.id, user_id, &meeting.creator_id)
                        .await
                }
                MembershipEvent::MemberRemoved { user_id, .. } => {
                    self.store.remove_participant(&meeting.id, user_id).await
                }
            };

            match outcome {
                Ok(true) => report.touched.push(meeting.id.clone()),
                Ok(false) => report.unchanged.push(meeting.id.clone()),
                Err(error) => {
                    warn!(meeting_id = %meeting.id, %error, "participant projection failed");
                    report.failures.push((meeting.id.clone(), error));
                }
            }
        }

        debug!(
            meetings = meetings.len(),
            touched = report.touched.len(),
            failed = report.failures.len(),
            "membership event projected"
        );
        Ok(report)
    }

    async fn add_if_missing(
        &self,
        meeting_id: &str,
        user_id: &str,
        creator_id: &str,
    ) -> std::result::Result<bool, StoreError> {
        let participants = self.store.participants(meeting_id).await?;
        if participants.iter().any(|p| p.user_id == user_id) {
            return Ok(false);
        }
        self.store
            .add_participant(
                meeting_id,
                user_id,
                ParticipantStatus::initial_for(user_id, creator_id),
            )
            .await?;
        Ok(true)
    }
}
