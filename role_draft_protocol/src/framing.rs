// Length-delimited framing for encoded draft messages.
//
// Each frame is a 2-byte big-endian length followed by one `codec::encode`
// payload. `send` / `recv` combine framing with the codec; `write_frame` /
// `read_frame` stay byte-level for transports that batch or relay frames
// without looking inside.
//
// Draft payloads are tiny (the largest is a recap of at most 255 short role
// names), so a u16 prefix with `MAX_FRAME_SIZE` at its ceiling is plenty and
// bounds what a corrupt prefix can make us allocate.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::message::DraftMessage;

/// Largest payload a single frame may carry.
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

/// Failure sending or receiving a framed message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("transport I/O: {0}")]
    Io(#[from] io::Error),
    #[error("malformed message: {0}")]
    Codec(#[from] CodecError),
    #[error("frame too large: {0} bytes (max {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),
}

/// Write one frame: length prefix, then payload.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError> {
    let len = u16::try_from(payload.len())
        .map_err(|_| ProtocolError::FrameTooLarge(payload.len()))?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one frame's payload. A stream that ends cleanly before or inside a
/// frame yields `Io` with `UnexpectedEof`.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 2];
    reader.read_exact(&mut len_buf)?;
    let len = usize::from(u16::from_be_bytes(len_buf));
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Encode and frame a message.
pub fn send<W: Write>(writer: &mut W, msg: &DraftMessage) -> Result<(), ProtocolError> {
    let payload = codec::encode(msg)?;
    write_frame(writer, &payload)
}

/// Read and decode one framed message.
pub fn recv<R: Read>(reader: &mut R) -> Result<DraftMessage, ProtocolError> {
    let payload = read_frame(reader)?;
    Ok(codec::decode(&payload)?)
}
