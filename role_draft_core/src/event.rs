// Draft events for UI-side subscribers.
//
// The coordinator (host) and the mirror (follower) never call into a UI
// directly. Every state transition pushes a `DraftEvent` onto an internal
// queue that the owner drains after each call and hands to
// `presenter::route_events` or whatever else wants to react. Events carry
// owned copies of the data they describe, so nothing borrows session state
// across the drain.

use role_draft_protocol::{ParticipantId, RecapEntry, SlotAssignment, SlotNumber, TurnNumber};
use serde::{Deserialize, Serialize};

use crate::postdraft::PostDraftPhase;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftEvent {
    /// Seating is known. `started` distinguishes a StartDraft from a plain
    /// re-notification.
    SlotsAssigned {
        slots: Vec<SlotAssignment>,
        started: bool,
    },
    /// A new turn opened with these offers on the table.
    OfferReady {
        turn: TurnNumber,
        slot: SlotNumber,
        picker: ParticipantId,
        offered: Vec<String>,
    },
    /// Host only: a slot's role is locked in.
    PickFinalized {
        slot: SlotNumber,
        picker: ParticipantId,
        role: String,
    },
    DraftComplete {
        show_recap: bool,
        picks: Vec<RecapEntry>,
    },
    DraftCancelled,
    /// The post-draft sequence entered a phase.
    PostDraft(PostDraftPhase),
    /// Host only, and only with auto-start configured.
    GameStartRequested,
    /// Close every open draft UI.
    CloseAll,
}
