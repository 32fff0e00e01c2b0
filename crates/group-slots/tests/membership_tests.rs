//! Tests for membership events and the participant projector.

use std::sync::Arc;

use group_slots::memory::{GroupRecord, UserRecord};
use group_slots::ports::MeetingStore;
use group_slots::{
    CalendarSnapshot, InMemoryCalendar, MeetingScheduler, MembershipEvent, NewMeeting,
    ParticipantProjector, ParticipantStatus, SlotError, StoreError,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn user(id: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        first_name: id.to_string(),
        last_name: "Member".to_string(),
        email: format!("{}@example.com", id),
    }
}

fn store() -> Arc<InMemoryCalendar> {
    let snapshot = CalendarSnapshot {
        users: vec![user("a"), user("b"), user("new")],
        groups: vec![GroupRecord {
            id: "team".to_string(),
            name: "Team".to_string(),
            members: vec!["a".to_string(), "b".to_string()],
        }],
        events: vec![],
    };
    Arc::new(InMemoryCalendar::from_snapshot(snapshot).unwrap())
}

/// Schedule two meetings in "team", created by "a".
async fn two_meetings(store: &Arc<InMemoryCalendar>) -> Vec<String> {
    let scheduler = MeetingScheduler::new(store.clone(), store.clone());
    let mut ids = Vec::new();
    for (title, start, end) in [
        ("Planning", "2026-03-16T13:00:00Z", "2026-03-16T14:00:00Z"),
        ("Retro", "2026-03-17T15:00:00Z", "2026-03-17T16:00:00Z"),
    ] {
        let draft = NewMeeting::parse("team", title, start, end).unwrap();
        ids.push(scheduler.schedule("a", draft).await.unwrap().meeting.id);
    }
    ids
}

async fn status_of(
    store: &InMemoryCalendar,
    meeting_id: &str,
    user_id: &str,
) -> Option<ParticipantStatus> {
    store
        .participants(meeting_id)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.user_id == user_id)
        .map(|p| p.status)
}

// ── Events from the store ───────────────────────────────────────────────────

#[tokio::test]
async fn add_member_emits_member_added() {
    let store = store();
    let event = store.add_member("team", "new").await.unwrap();
    assert_eq!(
        event,
        MembershipEvent::MemberAdded {
            group_id: "team".to_string(),
            user_id: "new".to_string(),
        }
    );
}

#[tokio::test]
async fn adding_existing_member_is_a_conflict() {
    let store = store();
    let err = store.add_member("team", "a").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn removing_non_member_is_not_found() {
    let store = store();
    let err = store.remove_member("team", "new").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn membership_event_serializes_with_type_tag() {
    let event = MembershipEvent::MemberRemoved {
        group_id: "team".to_string(),
        user_id: "b".to_string(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "MemberRemoved");
    assert_eq!(json["user_id"], "b");
}

// ── Projection ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn member_added_joins_every_group_meeting_as_pending() {
    let store = store();
    let meetings = two_meetings(&store).await;
    let projector = ParticipantProjector::new(store.clone());

    let event = store.add_member("team", "new").await.unwrap();
    let report = projector.apply(&event).await.unwrap();

    assert_eq!(report.touched.len(), 2);
    assert!(report.failures.is_empty());
    for id in &meetings {
        assert_eq!(status_of(&store, id, "new").await, Some(ParticipantStatus::Pending));
    }
}

#[tokio::test]
async fn member_added_twice_leaves_existing_rows_alone() {
    let store = store();
    let meetings = two_meetings(&store).await;
    let projector = ParticipantProjector::new(store.clone());
    store
        .set_participant_status(&meetings[0], "b", ParticipantStatus::Declined)
        .await
        .unwrap();

    let replay = MembershipEvent::MemberAdded {
        group_id: "team".to_string(),
        user_id: "b".to_string(),
    };
    let report = projector.apply(&replay).await.unwrap();

    assert!(report.touched.is_empty());
    assert_eq!(report.unchanged.len(), 2);
    assert_eq!(
        status_of(&store, &meetings[0], "b").await,
        Some(ParticipantStatus::Declined)
    );
}

#[tokio::test]
async fn creator_rejoining_is_accepted() {
    let store = store();
    let meetings = two_meetings(&store).await;
    let projector = ParticipantProjector::new(store.clone());

    let removed = store.remove_member("team", "a").await.unwrap();
    projector.apply(&removed).await.unwrap();
    assert_eq!(status_of(&store, &meetings[0], "a").await, None);

    let added = store.add_member("team", "a").await.unwrap();
    projector.apply(&added).await.unwrap();
    assert_eq!(
        status_of(&store, &meetings[0], "a").await,
        Some(ParticipantStatus::Accepted)
    );
}

#[tokio::test]
async fn member_removed_leaves_every_group_meeting() {
    let store = store();
    let meetings = two_meetings(&store).await;
    let projector = ParticipantProjector::new(store.clone());

    let event = store.remove_member("team", "b").await.unwrap();
    let report = projector.apply(&event).await.unwrap();

    assert_eq!(report.touched, meetings);
    for id in &meetings {
        assert_eq!(status_of(&store, id, "b").await, None);
    }
}

#[tokio::test]
async fn per_meeting_failures_are_collected() {
    let store = store();
    two_meetings(&store).await;
    let projector = ParticipantProjector::new(store.clone());
    store.reject_participant("new").await;

    let event = store.add_member("team", "new").await.unwrap();
    let report = projector.apply(&event).await.unwrap();

    assert!(report.touched.is_empty());
    assert_eq!(report.failures.len(), 2);
}

#[tokio::test]
async fn offline_store_fails_projection() {
    let store = store();
    let projector = ParticipantProjector::new(store.clone());
    let event = store.add_member("team", "new").await.unwrap();
    store.set_offline(true);

    let err = projector.apply(&event).await.unwrap_err();
    assert!(matches!(err, SlotError::Store(StoreError::Unavailable(_))));
}
