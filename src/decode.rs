//! Incremental UTF-8 decoding of arbitrarily split byte chunks.
//!
//! Network chunks carry no alignment guarantee, so a multi-byte character may
//! straddle two (or more) chunks. [`Utf8Decoder`] emits only complete
//! characters and carries an incomplete tail forward to the next chunk.

use futures::stream::{self, Stream, StreamExt};
use tracing::trace;

use crate::error::{DecodeError, StreamError};

/// Stateful byte-to-text decoder.
///
/// # Example
/// ```
/// use sseflow::decode::Utf8Decoder;
///
/// let mut decoder = Utf8Decoder::new();
/// // "€" is e2 82 ac
/// assert_eq!(decoder.feed(b"price: \xe2\x82").unwrap(), "price: ");
/// assert_eq!(decoder.feed(b"\xac5").unwrap(), "€5");
/// assert_eq!(decoder.finish().unwrap(), "");
/// ```
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
    consumed: usize,
    failed: Option<DecodeError>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, prepending any tail retained from the previous one.
    ///
    /// Returns the longest prefix made of complete characters. An incomplete
    /// trailing sequence is kept for the next call. A sequence that can never
    /// become valid is an error. Text before the bad sequence is still
    /// returned; the error is then reported by the next `feed` or `finish`.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<String, DecodeError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        if chunk.is_empty() {
            return Ok(String::new());
        }
        self.pending.extend_from_slice(chunk);

        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(err) => match err.error_len() {
                Some(len) => {
                    let start = err.valid_up_to();
                    let bytes = self.pending[start..start + len].to_vec();
                    let err = DecodeError::Invalid {
                        offset: self.consumed + start,
                        bytes,
                    };
                    if start == 0 {
                        self.pending.clear();
                        return Err(err);
                    }
                    self.failed = Some(err);
                    start
                }
                // Truncated sequence at the end: wait for more bytes.
                None => err.valid_up_to(),
            },
        };

        // The prefix was just validated, so the lossy conversion never substitutes.
        let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
        self.pending.drain(..valid);
        self.consumed += valid;
        if self.failed.is_some() {
            // nothing after the bad sequence is decoded
            self.pending.clear();
        }
        Ok(text)
    }

    /// Flush at end of stream.
    ///
    /// Leftover bytes cannot form a character any more, so they are reported
    /// rather than replaced. The decoder is empty afterwards either way.
    pub fn finish(&mut self) -> Result<String, DecodeError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        if self.pending.is_empty() {
            return Ok(String::new());
        }
        Err(DecodeError::Incomplete {
            bytes: std::mem::take(&mut self.pending),
        })
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn take_failure(&mut self) -> Option<DecodeError> {
        self.failed.take()
    }
}

/// Turn a byte chunk stream into a stream of complete-character fragments.
///
/// Source errors and decode errors are yielded once and end the stream.
/// Chunks that decode to nothing (empty, or only the start of a character)
/// produce no item; the adapter keeps pulling until it has text.
pub fn decode_utf8<S, B, E>(source: S) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<StreamError>,
{
    stream::unfold(
        Some((Box::pin(source), Utf8Decoder::new())),
        |state| async move {
            let (mut source, mut decoder) = state?;
            // An invalid sequence found behind valid text is reported before pulling again.
            if let Some(e) = decoder.take_failure() {
                return Some((Err(e.into()), None));
            }
            loop {
                match source.next().await {
                    Some(Ok(chunk)) => {
                        let chunk = chunk.as_ref();
                        trace!(len = chunk.len(), "received byte chunk");
                        match decoder.feed(chunk) {
                            Ok(text) if text.is_empty() => continue,
                            Ok(text) => return Some((Ok(text), Some((source, decoder)))),
                            Err(e) => return Some((Err(e.into()), None)),
                        }
                    }
                    Some(Err(e)) => return Some((Err(e.into()), None)),
                    None => {
                        return match decoder.finish() {
                            Ok(_) => None,
                            Err(e) => Some((Err(e.into()), None)),
                        };
                    }
                }
            }
        },
    )
}
