//! In-memory implementation of every store port.
//!
//! Backs the CLI (seeded from a JSON [`CalendarSnapshot`]) and the tests.
//! Membership changes return a [`MembershipEvent`] instead of touching meeting
//! participants; feed it to a [`crate::membership::ParticipantProjector`].

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::interval::Interval;
use crate::meetings::{Meeting, MeetingStatus, NewMeeting, Participant, ParticipantStatus};
use crate::membership::MembershipEvent;
use crate::ports::{BusyIntervalSource, BusyRecord, Member, MeetingStore, MembershipResolver};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
    /// User ids in join order.
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub user_id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default = "default_busy")]
    pub is_busy: bool,
}

fn default_busy() -> bool {
    true
}

/// Seed data for [`InMemoryCalendar`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSnapshot {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

struct StoredEvent {
    user_id: String,
    title: String,
    interval: Interval,
    is_busy: bool,
}

#[derive(Default)]
struct State {
    users: HashMap<String, UserRecord>,
    groups: HashMap<String, GroupRecord>,
    events: Vec<StoredEvent>,
    meetings: Vec<Meeting>,
    participants: HashMap<String, Vec<Participant>>,
    rejected_participants: HashSet<String>,
}

pub struct InMemoryCalendar {
    state: RwLock<State>,
    offline: AtomicBool,
}

impl Default for InMemoryCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            offline: AtomicBool::new(false),
        }
    }

    /// Load a snapshot, rejecting events with `end <= start` and group members
    /// that are not known users.
    pub fn from_snapshot(snapshot: CalendarSnapshot) -> Result<Self> {
        let mut state = State::default();
        for user in snapshot.users {
            state.users.insert(user.id.clone(), user);
        }
        for group in snapshot.groups {
            if let Some(unknown) = group.members.iter().find(|id| !state.users.contains_key(*id)) {
                return Err(StoreError::NotFound(format!(
                    "user {} in group {}",
                    unknown, group.id
                ))
                .into());
            }
            state.groups.insert(group.id.clone(), group);
        }
        for event in snapshot.events {
            state.events.push(StoredEvent {
                interval: Interval::new(event.start_time, event.end_time)?,
                user_id: event.user_id,
                title: event.title,
                is_busy: event.is_busy,
            });
        }

        Ok(Self {
            state: RwLock::new(state),
            offline: AtomicBool::new(false),
        })
    }

    /// While offline every port call fails with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make every future participant insert for `user_id` fail.
    pub async fn reject_participant(&self, user_id: &str) {
        self.state
            .write()
            .await
            .rejected_participants
            .insert(user_id.to_string());
    }

    /// Insert or replace a user.
    pub async fn add_user(&self, user: UserRecord) {
        self.state.write().await.users.insert(user.id.clone(), user);
    }

    /// Insert or replace a group. Members are taken as given; use
    /// [`add_member`](Self::add_member) to get a [`MembershipEvent`].
    pub async fn add_group(&self, group: GroupRecord) {
        self.state.write().await.groups.insert(group.id.clone(), group);
    }

    /// Record a calendar event, rejecting `end <= start`.
    pub async fn add_event(&self, event: EventRecord) -> Result<()> {
        let interval = Interval::new(event.start_time, event.end_time)?;
        self.state.write().await.events.push(StoredEvent {
            user_id: event.user_id,
            title: event.title,
            interval,
            is_busy: event.is_busy,
        });
        Ok(())
    }

    /// Append `user_id` to the group's members.
    pub async fn add_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> std::result::Result<MembershipEvent, StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        if !state.users.contains_key(user_id) {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        let group = state
            .groups
            .get_mut(group_id)
            .ok_or_else(|| StoreError::NotFound(format!("group {}", group_id)))?;
        if group.members.iter().any(|m| m == user_id) {
            return Err(StoreError::Conflict(format!(
                "user {} is already a member of group {}",
                user_id, group_id
            )));
        }
        group.members.push(user_id.to_string());

        Ok(MembershipEvent::MemberAdded {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub async fn remove_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> std::result::Result<MembershipEvent, StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let group = state
            .groups
            .get_mut(group_id)
            .ok_or_else(|| StoreError::NotFound(format!("group {}", group_id)))?;
        let before = group.members.len();
        group.members.retain(|m| m != user_id);
        if group.members.len() == before {
            return Err(StoreError::NotFound(format!(
                "user {} in group {}",
                user_id, group_id
            )));
        }

        Ok(MembershipEvent::MemberRemoved {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
        })
    }

    fn ensure_online(&self) -> std::result::Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory calendar is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipResolver for InMemoryCalendar {
    async fn resolve_members(
        &self,
        group_id: &str,
        caller: &str,
    ) -> std::result::Result<Vec<Member>, StoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        let group = state
            .groups
            .get(group_id)
            .ok_or_else(|| StoreError::NotFound(format!("group {}", group_id)))?;
        if !group.members.iter().any(|m| m == caller) {
            return Err(StoreError::Forbidden(format!(
                "user {} is not a member of group {}",
                caller, group_id
            )));
        }

        group
            .members
            .iter()
            .map(|id| {
                let user = state
                    .users
                    .get(id)
                    .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
                Ok(Member {
                    user_id: user.id.clone(),
                    name: user.display_name(),
                    email: user.email.clone(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl BusyIntervalSource for InMemoryCalendar {
    async fn fetch_busy_intervals(
        &self,
        user_ids: &[String],
        range: &Interval,
    ) -> std::result::Result<Vec<BusyRecord>, StoreError> {
        self.ensure_online()?;
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.state.read().await;
        let mut records: Vec<BusyRecord> = state
            .events
            .iter()
            .filter(|e| e.is_busy && e.interval.touches(range))
            .filter(|e| user_ids.iter().any(|id| *id == e.user_id))
            .map(|e| BusyRecord {
                user_id: e.user_id.clone(),
                interval: e.interval,
                label: e.title.clone(),
            })
            .collect();
        records.sort_by_key(|r| r.interval.start);
        Ok(records)
    }
}

#[async_trait]
impl MeetingStore for InMemoryCalendar {
    async fn create_meeting(
        &self,
        draft: &NewMeeting,
        creator_id: &str,
    ) -> std::result::Result<Meeting, StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&draft.group_id) {
            return Err(StoreError::NotFound(format!("group {}", draft.group_id)));
        }

        let meeting = Meeting {
            id: Uuid::new_v4().to_string(),
            group_id: draft.group_id.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            interval: draft.interval,
            creator_id: creator_id.to_string(),
            status: MeetingStatus::Scheduled,
        };
        state.participants.insert(meeting.id.clone(), Vec::new());
        state.meetings.push(meeting.clone());
        Ok(meeting)
    }

    async fn meeting(&self, meeting_id: &str) -> std::result::Result<Meeting, StoreError> {
        self.ensure_online()?;
        self.state
            .read()
            .await
            .meetings
            .iter()
            .find(|m| m.id == meeting_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("meeting {}", meeting_id)))
    }

    async fn update_meeting(
        &self,
        meeting: &Meeting,
    ) -> std::result::Result<Meeting, StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let stored = state
            .meetings
            .iter_mut()
            .find(|m| m.id == meeting.id)
            .ok_or_else(|| StoreError::NotFound(format!("meeting {}", meeting.id)))?;
        *stored = meeting.clone();
        Ok(meeting.clone())
    }

    async fn delete_meeting(&self, meeting_id: &str) -> std::result::Result<(), StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let before = state.meetings.len();
        state.meetings.retain(|m| m.id != meeting_id);
        if state.meetings.len() == before {
            return Err(StoreError::NotFound(format!("meeting {}", meeting_id)));
        }
        state.participants.remove(meeting_id);
        Ok(())
    }

    async fn meetings_for_group(
        &self,
        group_id: &str,
    ) -> std::result::Result<Vec<Meeting>, StoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        let mut meetings: Vec<Meeting> = state
            .meetings
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        meetings.sort_by_key(|m| m.interval.start);
        Ok(meetings)
    }

    async fn participants(
        &self,
        meeting_id: &str,
    ) -> std::result::Result<Vec<Participant>, StoreError> {
        self.ensure_online()?;
        self.state
            .read()
            .await
            .participants
            .get(meeting_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("meeting {}", meeting_id)))
    }

    async fn add_participant(
        &self,
        meeting_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> std::result::Result<(), StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        if state.rejected_participants.contains(user_id) {
            return Err(StoreError::Unavailable(format!(
                "participant insert rejected for user {}",
                user_id
            )));
        }
        let rows = state
            .participants
            .get_mut(meeting_id)
            .ok_or_else(|| StoreError::NotFound(format!("meeting {}", meeting_id)))?;

        match rows.iter_mut().find(|p| p.user_id == user_id) {
            Some(existing) => existing.status = status,
            None => rows.push(Participant {
                user_id: user_id.to_string(),
                status,
            }),
        }
        Ok(())
    }

    async fn remove_participant(
        &self,
        meeting_id: &str,
        user_id: &str,
    ) -> std::result::Result<bool, StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let rows = state
            .participants
            .get_mut(meeting_id)
            .ok_or_else(|| StoreError::NotFound(format!("meeting {}", meeting_id)))?;
        let before = rows.len();
        rows.retain(|p| p.user_id != user_id);
        Ok(rows.len() != before)
    }

    async fn set_participant_status(
        &self,
        meeting_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> std::result::Result<(), StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let participant = state
            .participants
            .get_mut(meeting_id)
            .and_then(|rows| rows.iter_mut().find(|p| p.user_id == user_id))
            .ok_or_else(|| {
                StoreError::NotFound(format!(
                    "user {} is not a participant of meeting {}",
                    user_id, meeting_id
                ))
            })?;
        participant.status = status;
        Ok(())
    }
}
