//! Options for the display pipeline and for the HTTP transport.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{BoxStream, Stream, StreamExt};

use crate::error::StreamError;
use crate::pipeline::{boxed_stage, compose, BoxStage};
use crate::stages::{chars, paced, progress_markers, upper};
use crate::wrap::{wrap_lines, LineWrapper, DEFAULT_MAX_WIDTH};

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// How extracted text is shaped before it reaches the display.
///
/// # Example
/// ```rust
/// use sseflow::options::PipelineOptions;
///
/// let options = PipelineOptions::default()
///     .with_max_width(60)
///     .with_pace_ms(15);
/// assert_eq!(options.max_width, 60);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineOptions {
    /// Maximum line width in characters (must be at least 1)
    pub max_width: usize,

    /// Delay between characters in milliseconds; 0 disables pacing
    pub pace_ms: u64,

    /// Emit a `[N chars streamed]` marker every N characters
    pub progress_interval: Option<usize>,

    /// Upper-case the text before wrapping
    pub uppercase: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            pace_ms: 0,
            progress_interval: None,
            uppercase: false,
        }
    }
}

impl PipelineOptions {
    /// Set the wrap width.
    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    /// Set the per-character delay.
    pub fn with_pace_ms(mut self, pace_ms: u64) -> Self {
        self.pace_ms = pace_ms;
        self
    }

    /// Set the progress marker interval.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    pub fn with_uppercase(mut self, uppercase: bool) -> Self {
        self.uppercase = uppercase;
        self
    }

    pub fn pace(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }

    /// Build the configured display stages over a stream of text fragments.
    ///
    /// Order: progress markers, case, wrap, then per-character pacing.
    pub fn apply<S>(&self, fragments: S) -> Result<BoxStream<'static, Result<String, StreamError>>, StreamError>
    where
        S: Stream<Item = Result<String, StreamError>> + Send + 'static,
    {
        let wrapper = LineWrapper::new(self.max_width)?;

        let mut stages: Vec<BoxStage<'static, Result<String, StreamError>>> = Vec::new();
        if let Some(interval) = self.progress_interval {
            stages.push(boxed_stage(move |s| progress_markers(s, interval)));
        }
        if self.uppercase {
            stages.push(boxed_stage(upper));
        }
        stages.push(boxed_stage(move |s| wrap_lines(s, wrapper)));
        if self.pace_ms > 0 {
            let delay = self.pace();
            stages.push(boxed_stage(chars));
            stages.push(boxed_stage(move |s| paced(s, delay)));
        }

        Ok(compose(fragments.boxed(), stages))
    }
}

/// Model parameters for the streaming request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOptions {
    /// Model identifier
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
        }
    }
}

impl MessageOptions {
    /// Set the model identifier.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Set maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// HTTP transport options.
///
/// # Example
/// ```rust
/// use sseflow::options::TransportOptions;
/// use std::time::Duration;
///
/// let options = TransportOptions::new("sk-...")
///     .with_timeout(Duration::from_secs(30))
///     .with_header("x-trace".to_string(), "1".to_string());
/// assert!(options.api_key.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Request timeout
    pub timeout: Option<Duration>,

    /// API key for authentication
    pub api_key: Option<SecretString>,

    /// Base URL for API endpoints
    pub base_url: Option<String>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl TransportOptions {
    /// Create new transport options with an API key.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}
