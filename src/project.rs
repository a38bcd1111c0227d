//! Projection of decoded SSE events onto displayable text.

use futures::future;
use futures::stream::{Stream, TryStreamExt};
use serde::Deserialize;

use crate::error::StreamError;
use crate::sse::SseEvent;

/// Text destined for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDelta(pub String);

impl ContentDelta {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// --- Streaming event shapes ---

/// Only the content delta carries text; every other event kind collapses into `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum StreamEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: Delta },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    text: Option<String>,
}

/// Extract the content delta carried by an event, if any.
///
/// Most event kinds (message start, pings, block stops) carry no text and
/// yield `None`, as does a content delta with an empty or missing `text`.
///
/// # Example
/// ```
/// use serde_json::json;
/// use sseflow::project::{project, ContentDelta};
/// use sseflow::sse::SseEvent;
///
/// let payload = json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "Hi"}});
/// let event = SseEvent { data: payload.to_string(), payload };
/// assert_eq!(project(&event), Some(ContentDelta("Hi".to_string())));
/// ```
pub fn project(event: &SseEvent) -> Option<ContentDelta> {
    match StreamEvent::deserialize(&event.payload).ok()? {
        StreamEvent::ContentBlockDelta {
            delta: Delta { text: Some(text) },
        } if !text.is_empty() => Some(ContentDelta(text)),
        _ => None,
    }
}

/// Map a stream of events to the text of their content deltas.
pub fn content_deltas<S>(events: S) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<SseEvent, StreamError>>,
{
    events.try_filter_map(|event| future::ready(Ok(project(&event).map(ContentDelta::into_string))))
}
