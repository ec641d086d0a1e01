// role_draft_protocol — wire protocol between a draft host and its followers.
//
// Shared by the host coordinator and every follower mirror; has no
// dependency on the draft core, so a transport can link it alone.
//
// Module overview:
// - `types.rs`:   ID newtypes: `ParticipantId`, `SlotNumber`, `TurnNumber`.
// - `message.rs`: `DraftMessage` (five kinds) plus `SlotAssignment` and
//                 `RecapEntry`.
// - `codec.rs`:   bincode payloads (fixed-width, big-endian, fields in
//                 declaration order); decode rejects trailing bytes.
// - `framing.rs`: u16 length-prefixed frames over any `Read`/`Write`.
//
// The transport underneath is assumed ordered and deduplicating; nothing
// here retries, acknowledges, or reorders.

pub mod codec;
pub mod framing;
pub mod message;
pub mod types;

pub use codec::{CodecError, decode, encode};
pub use framing::{MAX_FRAME_SIZE, ProtocolError, read_frame, recv, send, write_frame};
pub use message::{DraftMessage, RecapEntry, SlotAssignment};
pub use types::{ParticipantId, SlotNumber, TurnNumber};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_broadcast_classification() {
        assert!(!DraftMessage::SubmitPick { choice_index: 0 }.is_host_broadcast());
        assert!(DraftMessage::SlotNotify { slots: vec![] }.is_host_broadcast());
        assert!(
            DraftMessage::Recap {
                show_recap: true,
                picks: vec![]
            }
            .is_host_broadcast()
        );
    }

    #[test]
    fn messages_also_serialize_as_json() {
        // Debug tooling dumps messages as JSON.
        let msg = DraftMessage::StartDraft {
            total_slots: 1,
            slots: vec![SlotAssignment {
                participant: ParticipantId(3),
                slot: SlotNumber(1),
            }],
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: DraftMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn display_forms() {
        assert_eq!(ParticipantId(4).to_string(), "P4");
        assert_eq!(SlotNumber(2).to_string(), "#2");
        assert_eq!(TurnNumber(9).to_string(), "9");
    }
}
