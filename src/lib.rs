//! # sseflow - incremental SSE text streaming
//!
//! Decodes a server-sent-events response arriving as arbitrary byte chunks
//! and shapes the extracted text through a chain of lazy stream stages,
//! without ever buffering the whole response.
//!
//! ## Architecture
//!
//! Every component is a pull-based [`futures::Stream`] adapter; nothing runs
//! ahead of the consumer and dropping the outermost stream releases the
//! source.
//!
//! 1. [`decode`]: bytes → complete-character fragments
//! 2. [`sse`]: fragments → `data:` events (malformed frames skipped, `[DONE]` ends)
//! 3. [`project`]: events → content text
//! 4. [`pipeline`] and [`stages`]: generic composition and per-element transforms
//! 5. [`wrap`]: fragments → width-bounded lines
//!
//! [`client`] opens the byte stream over HTTP; [`options`] configures both
//! the transport and the display pipeline.
//!
//! ## Example
//! ```no_run
//! use futures::StreamExt;
//! use sseflow::client::{AnthropicClient, StreamingClient};
//! use sseflow::options::{MessageOptions, PipelineOptions, TransportOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnthropicClient::new(MessageOptions::default(), TransportOptions::new("your-api-key"));
//!
//!     let text = client.stream_text("Hello!").await?;
//!     let mut lines = PipelineOptions::default().with_max_width(60).apply(text)?;
//!     while let Some(line) = lines.next().await {
//!         print!("{}", line?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod decode;
pub mod error;
pub mod http;
pub mod options;
pub mod pipeline;
pub mod project;
pub mod sse;
pub mod stages;
pub mod stream;
pub mod wrap;

// Re-exports for convenience
pub use client::{AnthropicClient, StreamingClient};
pub use error::{DecodeError, StreamError};
pub use pipeline::{Pipeline, Stage};
pub use stream::text_deltas;
pub use wrap::LineWrapper;
