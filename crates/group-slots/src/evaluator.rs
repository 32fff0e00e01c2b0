//! Classify candidate slots against the busy intervals of a group's members.

use serde::{Deserialize, Serialize};

use crate::interval::{Interval, OverlapRule};
use crate::slots::{CandidateSlot, SlotConflict};

/// One busy interval of a member, with the label shown in conflict messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyEntry {
    pub interval: Interval,
    pub label: String,
}

/// A member's identity plus their busy intervals for the evaluated range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAvailability {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub busy: Vec<BusyEntry>,
}

/// Annotate every slot with its availability and the conflicts that make it
/// unavailable.
///
/// Conflicts are appended in member order, then in busy-entry order within a
/// member. Any annotation already present on the input slots is discarded, so
/// evaluating a result again yields the same result.
///
/// Uses the inclusive rule; see [`evaluate_with`]. With no members every slot
/// is available.
pub fn evaluate(slots: Vec<CandidateSlot>, members: &[MemberAvailability]) -> Vec<CandidateSlot> {
    evaluate_with(slots, members, OverlapRule::Inclusive)
}

/// [`evaluate`] with an explicit overlap rule.
pub fn evaluate_with(
    slots: Vec<CandidateSlot>,
    members: &[MemberAvailability],
    rule: OverlapRule,
) -> Vec<CandidateSlot> {
    slots
        .into_iter()
        .map(|slot| {
            let conflicts: Vec<SlotConflict> = members
                .iter()
                .flat_map(|member| {
                    member
                        .busy
                        .iter()
                        .filter(|busy| rule.conflicts(&slot.interval, &busy.interval))
                        .map(|busy| SlotConflict {
                            user_id: member.user_id.clone(),
                            member_name: member.name.clone(),
                            label: busy.label.clone(),
                        })
                })
                .collect();

            CandidateSlot {
                interval: slot.interval,
                available: conflicts.is_empty(),
                conflicts,
            }
        })
        .collect()
}

/// The intervals of the available slots, in grid order.
pub fn available_intervals(slots: &[CandidateSlot]) -> Vec<Interval> {
    slots
        .iter()
        .filter(|slot| slot.available)
        .map(|slot| slot.interval)
        .collect()
}
