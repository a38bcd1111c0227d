//! Streaming client trait and the Anthropic Messages API implementation.
//!
//! The client only opens the byte stream; decoding and projection happen in
//! [`crate::stream::text_deltas`].

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StreamError;
use crate::http::{add_extra_headers, build_http_client};
use crate::options::{MessageOptions, TransportOptions};
use crate::stream::text_deltas;

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A source of raw SSE bytes for a prompt.
///
/// Implement this trait to plug another provider or a test double into the
/// pipeline.
///
/// # Example
/// ```rust,ignore
/// let client = AnthropicClient::new(MessageOptions::default(), TransportOptions::new(api_key));
/// let mut text = client.stream_text("Hello!").await?;
/// while let Some(fragment) = text.next().await {
///     print!("{}", fragment?);
/// }
/// ```
#[async_trait]
pub trait StreamingClient: Send + Sync {
    /// Send the request and return the response body as a byte stream.
    ///
    /// An unsuccessful status is reported here, before any byte is streamed.
    async fn open_stream(&self, prompt: &str) -> Result<BoxStream<'static, Result<Bytes, StreamError>>, StreamError>;

    /// Open the stream and extract its content text.
    async fn stream_text(&self, prompt: &str) -> Result<BoxStream<'static, Result<String, StreamError>>, StreamError> {
        let bytes = self.open_stream(prompt).await?;
        Ok(text_deltas(bytes).boxed())
    }
}

/// Anthropic Messages API client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    message_options: MessageOptions,
    transport_options: TransportOptions,
}

impl AnthropicClient {
    pub fn new(message_options: MessageOptions, transport_options: TransportOptions) -> Self {
        Self {
            message_options,
            transport_options,
        }
    }

    pub fn message_options(&self) -> &MessageOptions {
        &self.message_options
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }

    fn build_request(&self, prompt: &str) -> Result<reqwest::RequestBuilder, StreamError> {
        // Validate API key is present
        let api_key = self
            .transport_options
            .api_key
            .as_ref()
            .ok_or_else(|| StreamError::Config("API key is required".to_string()))?;

        let api_base = self
            .transport_options
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE);
        let url = format!("{}/v1/messages", api_base.trim_end_matches('/'));

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key.expose_secret())
                .map_err(|_| StreamError::Config("Invalid API key".to_string()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = build_http_client(&self.transport_options)?;
        let req = http_client
            .post(&url)
            .headers(headers)
            .json(&MessagesRequest::new(prompt, &self.message_options));

        Ok(add_extra_headers(req, &self.transport_options.extra_headers))
    }

    /// Handle Anthropic error responses.
    fn handle_error_response(status: reqwest::StatusCode, body: &str) -> StreamError {
        let body = match serde_json::from_str::<AnthropicErrorResponse>(body) {
            Ok(error_resp) => format!(
                "Anthropic error ({}): {}",
                error_resp.error.error_type, error_resp.error.message
            ),
            Err(_) => body.to_string(),
        };
        StreamError::Status {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl StreamingClient for AnthropicClient {
    async fn open_stream(&self, prompt: &str) -> Result<BoxStream<'static, Result<Bytes, StreamError>>, StreamError> {
        let response = self.build_request(prompt)?.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "streaming request failed");
            return Err(Self::handle_error_response(status, &body));
        }

        debug!(model = %self.message_options.model, "streaming response opened");
        Ok(response.bytes_stream().map_err(StreamError::from).boxed())
    }
}

// --- Anthropic API Request/Response Types ---

#[derive(Debug, Clone, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Clone, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> MessagesRequest<'a> {
    fn new(prompt: &'a str, options: &'a MessageOptions) -> Self {
        Self {
            model: &options.model,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: options.max_tokens,
            stream: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AnthropicErrorResponse {
    error: AnthropicError,
}

#[derive(Debug, Clone, Deserialize)]
struct AnthropicError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}
