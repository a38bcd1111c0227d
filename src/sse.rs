//! Server-Sent Events (SSE) frame parsing.
//!
//! SSE format:
//! ```text
//! data: {"key": "value"}
//!
//! data: {"another": "event"}
//!
//! data: [DONE]
//! ```
//!
//! Only `data: ` lines carry payload. Everything else (blank separators,
//! `event:` names, `:` comments) is ignored.

use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, trace};

use crate::decode::decode_utf8;
use crate::error::StreamError;

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";

/// A parsed `data:` frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// Text after the `data: ` prefix.
    pub data: String,
    /// `data` decoded as JSON.
    pub payload: Value,
}

/// A `data:` line whose payload is not valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedFrame {
    pub data: String,
    pub reason: String,
}

/// Outcome of parsing one payload-carrying line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Event(SseEvent),
    Skip(MalformedFrame),
    Done,
}

/// Parse an SSE line to extract the data portion.
///
/// Exactly the `data: ` prefix is stripped; the payload is not trimmed.
///
/// # Example
/// ```
/// use sseflow::sse::parse_sse_line;
///
/// let line = "data: {\"key\": \"value\"}";
/// assert_eq!(parse_sse_line(line), Some("{\"key\": \"value\"}"));
///
/// let line = "invalid";
/// assert_eq!(parse_sse_line(line), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX)
}

/// Check if an SSE data payload indicates the stream is done.
///
/// # Example
/// ```
/// use sseflow::sse::is_done_marker;
///
/// assert!(is_done_marker("[DONE]"));
/// assert!(!is_done_marker(""));
/// assert!(!is_done_marker("{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &str) -> bool {
    data == DONE_MARKER
}

/// Classify a single line. `None` means the line carries no payload.
pub fn parse_line(line: &str) -> Option<Frame> {
    let data = parse_sse_line(line)?;
    if is_done_marker(data) {
        return Some(Frame::Done);
    }
    let frame = match serde_json::from_str::<Value>(data) {
        Ok(payload) => Frame::Event(SseEvent {
            data: data.to_string(),
            payload,
        }),
        Err(e) => Frame::Skip(MalformedFrame {
            data: data.to_string(),
            reason: e.to_string(),
        }),
    };
    Some(frame)
}

/// Line buffer that turns decoded text fragments into frames.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: String,
    // bytes of `buffer` already known to hold no newline
    scanned: usize,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded fragment to the line buffer.
    pub fn push(&mut self, fragment: &str) {
        self.buffer.push_str(fragment);
    }

    /// Extract the next frame from the complete lines currently buffered.
    ///
    /// Lines without payload are consumed silently. Returns `None` once no
    /// complete line is left; the unterminated remainder stays buffered.
    pub fn next_frame(&mut self) -> Option<Frame> {
        while let Some(pos) = self.buffer[self.scanned..].find('\n') {
            let pos = self.scanned + pos;
            let frame = {
                let line = &self.buffer[..pos];
                parse_line(line.strip_suffix('\r').unwrap_or(line))
            };
            self.buffer.drain(..=pos);
            self.scanned = 0;
            if frame.is_some() {
                return frame;
            }
        }
        self.scanned = self.buffer.len();
        None
    }

    /// Drop whatever is left at end of input; it cannot be a complete line.
    ///
    /// Returns the number of bytes discarded.
    pub fn finish(&mut self) -> usize {
        let discarded = self.buffer.len();
        self.buffer.clear();
        self.scanned = 0;
        discarded
    }
}

/// Parse a stream of text fragments into SSE events.
///
/// Malformed frames are skipped, `[DONE]` ends the stream (the upstream is
/// dropped right there), and upstream errors are forwarded once before the
/// stream ends.
pub fn sse_events<S>(fragments: S) -> impl Stream<Item = Result<SseEvent, StreamError>>
where
    S: Stream<Item = Result<String, StreamError>>,
{
    stream::unfold(
        Some((Box::pin(fragments), FrameParser::new())),
        |state| async move {
            let (mut fragments, mut parser) = state?;
            loop {
                // Process complete lines from buffer
                while let Some(frame) = parser.next_frame() {
                    match frame {
                        Frame::Event(event) => {
                            return Some((Ok(event), Some((fragments, parser))));
                        }
                        Frame::Skip(malformed) => {
                            debug!(
                                data = %malformed.data,
                                reason = %malformed.reason,
                                "skipping malformed SSE frame"
                            );
                        }
                        Frame::Done => {
                            debug!("SSE stream reached done marker");
                            return None;
                        }
                    }
                }

                // No complete lines yet, continue reading
                match fragments.next().await {
                    Some(Ok(fragment)) => parser.push(&fragment),
                    Some(Err(e)) => return Some((Err(e), None)),
                    None => {
                        let discarded = parser.finish();
                        if discarded > 0 {
                            trace!(bytes = discarded, "discarding unterminated trailing line");
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Extension trait for `reqwest::Response` to enable SSE streaming.
///
/// # Example
/// ```ignore
/// use sseflow::sse::SseResponseExt;
///
/// let response = client.get("https://api.example.com/stream").send().await?;
///
/// let mut events = std::pin::pin!(response.sse_events());
/// while let Some(result) = events.next().await {
///     let event = result?;
///     println!("Event: {:?}", event.payload);
/// }
/// ```
pub trait SseResponseExt {
    /// Convert the response body into a stream of SSE events.
    fn sse_events(self) -> impl Stream<Item = Result<SseEvent, StreamError>> + Send;
}

impl SseResponseExt for reqwest::Response {
    fn sse_events(self) -> impl Stream<Item = Result<SseEvent, StreamError>> + Send {
        sse_events(decode_utf8(self.bytes_stream()))
    }
}
