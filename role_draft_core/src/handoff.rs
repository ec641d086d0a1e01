// End-of-draft hand-off to the role-assignment collaborator.
//
// Walks the finished session in turn order. For each slot with a chosen
// role: resolve the name through the `RoleRegistry` (case, space and hyphen
// insensitive), check the participant is still connected, and pass
// `(participant, RoleId, canonical name)` to the sink. Any slot that fails a
// step is skipped and logged; nothing here can fail the draft.

use role_draft_protocol::{ParticipantId, SlotNumber};

use crate::ports::{Lobby, RoleAssignmentSink};
use crate::registry::{RoleId, RoleRegistry};
use crate::session::DraftSession;

/// Why one slot's role was not handed off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandoffSkip {
    UnknownRole { slot: SlotNumber, role: String },
    Disconnected { slot: SlotNumber, participant: ParticipantId },
    Rejected { slot: SlotNumber, reason: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandoffReport {
    pub applied: Vec<(ParticipantId, RoleId)>,
    pub skipped: Vec<HandoffSkip>,
}

pub fn hand_off(
    session: &DraftSession,
    registry: &RoleRegistry,
    lobby: &dyn Lobby,
    sink: &mut dyn RoleAssignmentSink,
) -> HandoffReport {
    let mut report = HandoffReport::default();
    for state in session.states() {
        let Some(role) = state.chosen_role.as_deref() else {
            continue;
        };
        let resolved = registry
            .resolve(role)
            .and_then(|id| registry.canonical_name(id).map(|name| (id, name)));
        let Some((id, canonical)) = resolved else {
            tracing::warn!(
                slot = %state.slot,
                role,
                "no registered role matches; skipping hand-off"
            );
            report.skipped.push(HandoffSkip::UnknownRole {
                slot: state.slot,
                role: role.to_string(),
            });
            continue;
        };
        if !lobby.is_connected(state.participant) {
            tracing::warn!(
                slot = %state.slot,
                participant = %state.participant,
                "participant left before hand-off; skipping"
            );
            report.skipped.push(HandoffSkip::Disconnected {
                slot: state.slot,
                participant: state.participant,
            });
            continue;
        }
        match sink.apply(state.participant, id, canonical) {
            Ok(()) => report.applied.push((state.participant, id)),
            Err(e) => {
                tracing::warn!(slot = %state.slot, error = %e, "role assignment failed");
                report.skipped.push(HandoffSkip::Rejected {
                    slot: state.slot,
                    reason: e.to_string(),
                });
            }
        }
    }
    report
}
