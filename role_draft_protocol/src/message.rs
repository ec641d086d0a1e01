// Protocol messages exchanged during a draft.
//
// One enum, `DraftMessage`, covers both directions. Four kinds are only ever
// sent by the host (`SlotNotify`, `StartDraft`, `AnnounceTurn`, `Recap`);
// `SubmitPick` is the only thing a follower says. Sender identity is not part
// of the payload; the transport knows who sent what, and the host pairs the
// two when it calls `handle_message`.
//
// Role names travel as plain strings. Receivers normalize them against their
// role registry at the edge; nothing past the protocol layer dispatches on
// the raw string.

use serde::{Deserialize, Serialize};

use crate::types::{ParticipantId, SlotNumber, TurnNumber};

/// Every message in the draft vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftMessage {
    /// Host → all: (re)publish the slot assignment. Followers rebuild their
    /// mirror and wait.
    SlotNotify { slots: Vec<SlotAssignment> },
    /// Host → all: a draft has begun with this assignment.
    StartDraft {
        total_slots: u8,
        slots: Vec<SlotAssignment>,
    },
    /// Host → all: `picker` (seated at `slot`) is now choosing from `offered`.
    AnnounceTurn {
        turn: TurnNumber,
        slot: SlotNumber,
        picker: ParticipantId,
        offered: Vec<String>,
    },
    /// Follower → host: pick `choice_index` from the current offer. An index
    /// past the end of the offer means "random".
    SubmitPick { choice_index: u8 },
    /// Host → all: the draft is over. `picks` is in turn order and empty when
    /// the draft was cancelled.
    Recap {
        show_recap: bool,
        picks: Vec<RecapEntry>,
    },
}

impl DraftMessage {
    /// True for the kinds only the host may originate.
    pub fn is_host_broadcast(&self) -> bool {
        !matches!(self, DraftMessage::SubmitPick { .. })
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DraftMessage::SlotNotify { .. } => "SlotNotify",
            DraftMessage::StartDraft { .. } => "StartDraft",
            DraftMessage::AnnounceTurn { .. } => "AnnounceTurn",
            DraftMessage::SubmitPick { .. } => "SubmitPick",
            DraftMessage::Recap { .. } => "Recap",
        }
    }
}

/// One seat in the turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub participant: ParticipantId,
    pub slot: SlotNumber,
}

/// One line of the end-of-draft summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapEntry {
    pub slot: SlotNumber,
    pub role: String,
}
