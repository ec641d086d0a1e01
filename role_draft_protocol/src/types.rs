// Compact ID newtypes shared by the wire protocol and the draft core.
//
// All three travel as fixed-width integers (see `codec.rs`): a participant
// and a slot fit in a byte (lobbies are far smaller than 255 seats), a turn
// number in a u16 so long drafts never wrap.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lobby-assigned participant identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u8);

/// A participant's fixed 1-based position in the pick order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotNumber(pub u8);

/// 1-based turn counter; `TurnNumber(0)` means no turn is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurnNumber(pub u16);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for TurnNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
