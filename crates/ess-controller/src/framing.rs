//! Newline-delimited JSON framing for the controller protocol (§4.E:
//! "carries line-delimited JSON objects in both directions. Terminator is a
//! fixed newline").

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};

use crate::error::ControllerError;

/// Reads successive newline-terminated JSON frames off an `AsyncRead` half.
pub struct FrameReader<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: BufReader::new(reader).lines() }
    }

    /// Returns the next frame, or `Ok(None)` once the peer closes the
    /// connection (EOF with no partial line pending).
    pub async fn read_frame<T: DeserializeOwned>(&mut self) -> Result<Option<T>, ControllerError> {
        match self.lines.next_line().await? {
            None => Ok(None),
            Some(line) => Ok(Some(serde_json::from_str(&line)?)),
        }
    }
}

/// Serializes `frame` and writes it followed by a single `\n` (§4.E).
pub async fn write_frame<W, T>(writer: &mut W, frame: &T) -> Result<(), ControllerError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut bytes = serde_json::to_vec(frame)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    Ok(())
}
