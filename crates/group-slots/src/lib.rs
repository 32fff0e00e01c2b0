//! # group-slots
//!
//! Group availability search for a shared calendar.
//!
//! Given a group, the busy intervals of its members and a date range, the
//! finder lays out a grid of candidate slots and marks each one available or
//! conflicting. Meeting scheduling and membership-driven participant updates
//! sit on top of the same store ports.
//!
//! ## Modules
//!
//! - [`interval`] — Time intervals and the inclusive conflict predicate
//! - [`slots`] — Candidate slot grid (range and single-day)
//! - [`evaluator`] — Classify slots against members' busy intervals
//! - [`ports`] — Membership, busy-interval and meeting store traits
//! - [`finder`] — Request validation and the end-to-end slot search
//! - [`meetings`] — Meeting scheduling with partial-success participant results
//! - [`membership`] — Membership events and the participant projector
//! - [`memory`] — In-memory store implementing every port
//! - [`config`] — Scheduling defaults
//! - [`error`] — Error types

pub mod config;
pub mod error;
pub mod evaluator;
pub mod finder;
pub mod interval;
pub mod meetings;
pub mod membership;
pub mod memory;
pub mod ports;
pub mod slots;

pub use config::SchedulingConfig;
pub use error::{SlotError, StoreError};
pub use evaluator::{evaluate, evaluate_with, BusyEntry, MemberAvailability};
pub use finder::{SlotFinder, SlotRequest};
pub use interval::{Interval, OverlapRule};
pub use meetings::{
    MeetingChanges, MeetingScheduler, MeetingStatus, NewMeeting, ParticipantStatus,
    ScheduledMeeting,
};
pub use membership::{MembershipEvent, ParticipantProjector};
pub use memory::{CalendarSnapshot, InMemoryCalendar};
pub use slots::{day_grid, generate_range, CandidateSlot, SlotConflict, WorkingHours};
