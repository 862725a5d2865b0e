// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed framing over an async byte stream.
//!
//! Each frame is a big-endian `u16` byte count followed by that many bytes
//! of ASCII payload (a single [`crate::message::Message`] line, without its
//! trailing newline). `write_all`/`read_exact` absorb partial writes and
//! short reads, so a frame either arrives whole or the connection is
//! treated as dead.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

use crate::error::ElevatorError;

/// Largest payload a single frame can carry.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Write `payload` as one length-prefixed frame.
pub async fn send_frame<W>(writer: &mut W, payload: &str) -> Result<(), ElevatorError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = payload.as_bytes();
    if bytes.len() > MAX_FRAME_LEN {
        return Err(ElevatorError::protocol(format!(
            "frame of {} bytes exceeds the {MAX_FRAME_LEN} byte limit",
            bytes.len()
        )));
    }
    let len = bytes.len() as u16;
    writer
        .write_all(&len.to_be_bytes())
        .await
        .map_err(|e| ElevatorError::transport(format!("writing frame length: {e}")))?;
    writer
        .write_all(bytes)
        .await
        .map_err(|e| ElevatorError::transport(format!("writing frame payload: {e}")))?;
    writer.flush().await.map_err(|e| ElevatorError::transport(format!("flushing: {e}")))?;
    Ok(())
}

/// Read one length-prefixed frame and decode it as UTF-8 text.
///
/// Returns `Ok(None)` on a clean EOF before any bytes of the next frame's
/// length prefix arrive, so callers can distinguish "peer hung up between
/// frames" from a genuine transport error.
pub async fn recv_frame<R>(reader: &mut R) -> Result<Option<String>, ElevatorError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 2];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => {
            warn!(error = %e, "reading frame length");
            return Err(ElevatorError::transport(format!("reading frame length: {e}")));
        }
    }
    let len = u16::from_be_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|e| {
        warn!(error = %e, len, "reading frame payload");
        ElevatorError::transport(format!("reading frame payload: {e}"))
    })?;
    String::from_utf8(payload)
        .map_err(|e| ElevatorError::protocol(format!("frame payload is not valid UTF-8: {e}")))
}

#[cfg(test)]
#[path = "framed_tests.rs"]
mod tests;
