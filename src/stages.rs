//! Per-element text transforms for use with [`crate::pipeline`].
//!
//! Every stage takes and returns a stream of `Result<String, StreamError>`.
//! Errors pass through untouched.

use std::time::Duration;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};

use crate::error::StreamError;

/// Split each fragment into one item per character.
pub fn chars<S>(input: S) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<String, StreamError>>,
{
    input.flat_map(|item| {
        let items: Vec<Result<String, StreamError>> = match item {
            Ok(fragment) => fragment.chars().map(|c| Ok(c.to_string())).collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(items)
    })
}

/// Upper-case every fragment. One character may expand to several (`ß` → `SS`).
pub fn upper<S>(input: S) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<String, StreamError>>,
{
    input.map_ok(|fragment| fragment.to_uppercase())
}

pub fn lower<S>(input: S) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<String, StreamError>>,
{
    input.map_ok(|fragment| fragment.to_lowercase())
}

/// Wait `delay` between consecutive items.
///
/// The first item is passed on immediately; the wait happens when the next
/// one is requested, so an abandoned stream never sleeps.
pub fn paced<S>(input: S, delay: Duration) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<String, StreamError>>,
{
    stream::unfold((Box::pin(input), false), move |(mut input, started)| async move {
        if started && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let item = input.next().await?;
        Some((item, (input, true)))
    })
}

/// Insert a `[N chars streamed]` marker whenever the running character
/// count lands on a multiple of `interval`. An interval of zero disables it.
pub fn progress_markers<S>(input: S, interval: usize) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<String, StreamError>>,
{
    let mut count = 0usize;
    input.flat_map(move |item| {
        let mut mark = false;
        if let Ok(fragment) = &item {
            if interval > 0 && !fragment.is_empty() {
                count += fragment.chars().count();
                mark = count % interval == 0;
            }
        }
        let mut items = vec![item];
        if mark {
            items.push(Ok(format!("\n[{count} chars streamed]\n")));
        }
        stream::iter(items)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::time::Instant;

    fn fragments(parts: &[&str]) -> impl Stream<Item = Result<String, StreamError>> {
        stream::iter(parts.iter().map(|p| Ok(p.to_string())).collect::<Vec<_>>())
    }

    fn collect(s: impl Stream<Item = Result<String, StreamError>>) -> Vec<String> {
        block_on(s.map(Result::unwrap).collect())
    }

    #[test]
    fn test_chars_flattens() {
        assert_eq!(collect(chars(fragments(&["hé", "", "y"]))), vec!["h", "é", "y"]);
    }

    #[test]
    fn test_chars_passes_errors() {
        let input = stream::iter(vec![
            Ok("ab".to_string()),
            Err(StreamError::Source("x".to_string())),
        ]);
        let out: Vec<_> = block_on(chars(input).collect());
        assert_eq!(out.len(), 3);
        assert!(out[2].is_err());
    }

    #[test]
    fn test_case_transforms() {
        assert_eq!(collect(upper(fragments(&["straße", "ok"]))), vec!["STRASSE", "OK"]);
        assert_eq!(collect(lower(fragments(&["HeLLo"]))), vec!["hello"]);
    }

    #[test]
    fn test_progress_markers() {
        let out = collect(progress_markers(fragments(&["abc", "de", "", "fghij"]), 5));
        assert_eq!(out, vec!["abc", "de", "\n[5 chars streamed]\n", "", "fghij", "\n[10 chars streamed]\n"]);

        let out = collect(progress_markers(fragments(&["abc"]), 0));
        assert_eq!(out, vec!["abc"]);
    }

    #[tokio::test]
    async fn test_paced_waits_between_items() {
        let start = Instant::now();
        let out: Vec<String> = paced(fragments(&["a", "b", "c"]), Duration::from_millis(20))
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(out, vec!["a", "b", "c"]);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_paced_zero_delay() {
        let out: Vec<String> = paced(fragments(&["a", "b"]), Duration::ZERO)
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(out, vec!["a", "b"]);
    }
}
