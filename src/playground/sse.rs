//! Line framing for server-sent-event streams.

use bytes::Bytes;

/// Literal payload signaling that no further completion chunks follow.
pub(crate) const DONE_SENTINEL: &str = "[DONE]";

/// Splits a byte stream into complete lines across chunk boundaries.
/// Providers do not align events to network chunks: one chunk may carry
/// many events, or a single line may arrive split down the middle.
#[derive(Default)]
pub(crate) struct SseLineReader {
    buffer: Vec<u8>,
}

impl SseLineReader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning every line it completes. Bytes
    /// after the last newline stay buffered for the next chunk.
    pub(crate) fn push(&mut self, chunk: &Bytes) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            match String::from_utf8(line) {
                Ok(line) => lines.push(line),
                Err(error) => {
                    tracing::debug!(%error, "skipping non-UTF-8 stream line")
                }
            }
        }
        lines
    }
}

/// The payload of a `data:` line, or `None` for comments, `event:` lines
/// and blank separators.
pub(crate) fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:")
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
}
