//! Error types shared by every pipeline stage.

use itertools::Itertools;
use thiserror::Error;

/// Errors that terminate a pipeline abnormally.
///
/// Malformed frames are not represented here: the frame parser skips them
/// and keeps going (see [`crate::sse::Frame::Skip`]).
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Byte source error: {0}")]
    Source(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StreamError {
    /// True for failures of the byte source or the HTTP exchange.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StreamError::Transport(_) | StreamError::Status { .. } | StreamError::Source(_)
        )
    }

    /// True when the bytes arrived but could not be decoded as text.
    pub fn is_decode(&self) -> bool {
        matches!(self, StreamError::Decode(_))
    }
}

/// Errors raised by [`crate::decode::Utf8Decoder`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream ended in the middle of a multi-byte character.
    #[error("stream ended inside a multi-byte character (trailing bytes: {})", hex(.bytes))]
    Incomplete { bytes: Vec<u8> },

    /// A byte sequence that can never form a valid character.
    #[error("invalid UTF-8 sequence at byte {offset}: {}", hex(.bytes))]
    Invalid { offset: usize, bytes: Vec<u8> },
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:#04x}")).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let decode = StreamError::from(DecodeError::Incomplete { bytes: vec![0xe2, 0x82] });
        assert!(decode.is_decode());
        assert!(!decode.is_transport());

        let status = StreamError::Status { status: 503, body: "overloaded".to_string() };
        assert!(status.is_transport());
        assert!(!status.is_decode());

        assert!(!StreamError::Config("bad".to_string()).is_transport());
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::Incomplete { bytes: vec![0xe2, 0x82] };
        assert_eq!(
            err.to_string(),
            "stream ended inside a multi-byte character (trailing bytes: 0xe2 0x82)"
        );
    }
}
