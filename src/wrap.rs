//! Width-bounded line wrapping over a stream of text fragments.
//!
//! Widths count `char`s. A line is broken at the last whitespace at or before
//! column `max_width`; the breaking whitespace is replaced by `\n`. A run with
//! no whitespace is hard-broken every `max_width` characters.

use futures::stream::{self, Stream, StreamExt};

use crate::error::StreamError;

pub const DEFAULT_MAX_WIDTH: usize = 80;

/// Stateful wrapper holding the text not yet emitted as a line.
#[derive(Debug, Clone)]
pub struct LineWrapper {
    max_width: usize,
    pending: String,
}

impl LineWrapper {
    pub fn new(max_width: usize) -> Result<Self, StreamError> {
        if max_width == 0 {
            return Err(StreamError::Config("max_width must be at least 1".to_string()));
        }
        Ok(Self {
            max_width,
            pending: String::new(),
        })
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Text buffered but not yet emitted.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Append a fragment without emitting anything.
    pub fn push(&mut self, fragment: &str) {
        self.pending.push_str(fragment);
    }

    /// Append a fragment and iterate over the lines it completes.
    ///
    /// # Example
    /// ```
    /// use sseflow::wrap::LineWrapper;
    ///
    /// let mut wrapper = LineWrapper::new(10).unwrap();
    /// let lines: Vec<String> = wrapper.feed("hello world foo").collect();
    /// assert_eq!(lines, vec!["hello\n"]);
    /// assert_eq!(wrapper.finish().as_deref(), Some("world foo"));
    /// assert_eq!(wrapper.finish(), None);
    /// ```
    pub fn feed(&mut self, fragment: &str) -> WrappedLines<'_> {
        self.push(fragment);
        WrappedLines { wrapper: self }
    }

    /// Emit one line if at least `max_width` characters are buffered.
    pub fn next_line(&mut self) -> Option<String> {
        let mut count = 0;
        let mut hard_end = None;
        let mut space = None;
        // Look at columns 0..=max_width; column max_width is a valid break point.
        for (idx, c) in self.pending.char_indices().take(self.max_width.saturating_add(1)) {
            if count == self.max_width {
                hard_end = Some(idx);
            }
            if count > 0 && c.is_whitespace() {
                space = Some((idx, c.len_utf8()));
            }
            count += 1;
        }
        if count < self.max_width {
            return None;
        }

        let mut line: String = match space {
            Some((idx, len)) => {
                let line = self.pending.drain(..idx).collect();
                self.pending.drain(..len);
                line
            }
            None => {
                let end = hard_end.unwrap_or(self.pending.len());
                self.pending.drain(..end).collect()
            }
        };
        line.push('\n');
        Some(line)
    }

    /// Flush the remaining text verbatim. Returns `None` when nothing is left.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.pending))
    }
}

impl Default for LineWrapper {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            pending: String::new(),
        }
    }
}

/// Lines completed by one [`LineWrapper::feed`] call.
#[derive(Debug)]
pub struct WrappedLines<'a> {
    wrapper: &'a mut LineWrapper,
}

impl Iterator for WrappedLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.wrapper.next_line()
    }
}

/// Wrap a stream of fragments into lines.
///
/// Complete lines end in `\n`; the final flush does not. An upstream error
/// is forwarded and ends the stream, dropping whatever was still buffered.
pub fn wrap_lines<S>(fragments: S, wrapper: LineWrapper) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<String, StreamError>>,
{
    stream::unfold(Some((Box::pin(fragments), wrapper)), |state| async move {
        let (mut fragments, mut wrapper) = state?;
        loop {
            if let Some(line) = wrapper.next_line() {
                return Some((Ok(line), Some((fragments, wrapper))));
            }
            match fragments.next().await {
                Some(Ok(fragment)) => wrapper.push(&fragment),
                Some(Err(e)) => return Some((Err(e), None)),
                None => return wrapper.finish().map(|rest| (Ok(rest), None)),
            }
        }
    })
}
