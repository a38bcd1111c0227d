//! End-to-end assembly: bytes → characters → SSE events → content text.

use futures::stream::Stream;

use crate::decode::decode_utf8;
use crate::error::StreamError;
use crate::project::content_deltas;
use crate::sse::sse_events;

/// Extract the content text from a raw SSE byte stream.
///
/// Ends cleanly at `[DONE]` or when the source ends. A transport or decode
/// failure is yielded as a single `Err` item, after which the stream ends.
///
/// # Example
/// ```
/// use futures::executor::block_on;
/// use futures::stream::{self, StreamExt};
/// use sseflow::error::StreamError;
/// use sseflow::stream::text_deltas;
///
/// let chunks: Vec<Result<String, StreamError>> = vec![
///     Ok("data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"Hi\"}}\n".to_string()),
///     Ok("data: [DONE]\n".to_string()),
/// ];
/// let text: Vec<String> = block_on(text_deltas(stream::iter(chunks)).map(Result::unwrap).collect());
/// assert_eq!(text, vec!["Hi"]);
/// ```
pub fn text_deltas<S, B, E>(source: S) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<StreamError>,
{
    content_deltas(sse_events(decode_utf8(source)))
}
