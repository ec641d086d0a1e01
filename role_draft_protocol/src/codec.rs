// Binary codec for `DraftMessage`.
//
// Payloads are bincode-serialized `DraftMessage` values: a big-endian u32
// variant index, then the variant's fields in declaration order, with
// fixed-width integers, u64 length prefixes on lists and strings, and bools
// as a single 0/1 byte. Field order therefore follows `message.rs`, so
// reordering fields there is a wire-format change.
//
// `decode` rejects trailing bytes, so a receiver that ignores a message (the
// host hearing its own broadcast echoed back, say) has still read it
// completely. Handlers only ever see fully decoded values; there is no way to
// half-read a message.

use bincode::Options;
use thiserror::Error;

use crate::framing::MAX_FRAME_SIZE;
use crate::message::DraftMessage;

/// Encoding or decoding failure.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encoding {kind}: {source}")]
    Encode {
        kind: &'static str,
        source: bincode::Error,
    },
    #[error("decoding message: {0}")]
    Decode(bincode::Error),
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
        .with_limit(MAX_FRAME_SIZE as u64)
        .reject_trailing_bytes()
}

/// Serialize a message into its wire bytes.
pub fn encode(msg: &DraftMessage) -> Result<Vec<u8>, CodecError> {
    options().serialize(msg).map_err(|source| CodecError::Encode {
        kind: msg.kind(),
        source,
    })
}

/// Parse wire bytes into a message, consuming every byte.
pub fn decode(bytes: &[u8]) -> Result<DraftMessage, CodecError> {
    options().deserialize(bytes).map_err(CodecError::Decode)
}
