use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::Poll;

use futures::executor::block_on;
use futures::stream::{self, Stream, StreamExt};
use sseflow::error::StreamError;
use sseflow::options::PipelineOptions;
use sseflow::pipeline::Pipeline;
use sseflow::stages::{chars, upper};
use sseflow::stream::text_deltas;
use sseflow::wrap::{wrap_lines, LineWrapper};

fn delta_line(text: &str) -> String {
    let payload = serde_json::json!({
        "type": "content_block_delta",
        "index": 0,
        "delta": {"type": "text_delta", "text": text}
    });
    format!("event: content_block_delta\ndata: {payload}\n\n")
}

fn sample_body() -> Vec<u8> {
    let mut body = String::new();
    body.push_str("event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n");
    body.push_str(": ping\n\n");
    body.push_str(&delta_line("Grüße, "));
    body.push_str(&delta_line("naïve café "));
    body.push_str(&delta_line("😀 done"));
    body.push_str("data: {\"type\":\"message_stop\"}\n\n");
    body.push_str("data: [DONE]\n");
    body.into_bytes()
}

fn source(chunks: Vec<Vec<u8>>) -> impl Stream<Item = Result<Vec<u8>, StreamError>> {
    stream::iter(chunks.into_iter().map(Ok))
}

fn deltas(chunks: Vec<Vec<u8>>) -> Vec<String> {
    block_on(text_deltas(source(chunks)).map(Result::unwrap).collect())
}

fn expected() -> Vec<String> {
    vec!["Grüße, ".to_string(), "naïve café ".to_string(), "😀 done".to_string()]
}

#[test]
fn test_every_two_way_split_gives_same_deltas() {
    let body = sample_body();
    for split in 0..=body.len() {
        let chunks = vec![body[..split].to_vec(), body[split..].to_vec()];
        assert_eq!(deltas(chunks), expected(), "split at {split}");
    }
}

#[test]
fn test_three_way_splits_and_single_bytes() {
    let body = sample_body();
    for a in (0..body.len()).step_by(7) {
        for b in (a..=body.len()).step_by(5) {
            let chunks = vec![body[..a].to_vec(), body[a..b].to_vec(), body[b..].to_vec()];
            assert_eq!(deltas(chunks), expected(), "splits at {a}, {b}");
        }
    }

    let bytes: Vec<Vec<u8>> = body.iter().map(|b| vec![*b]).collect();
    assert_eq!(deltas(bytes), expected());
}

#[test]
fn test_empty_chunks_change_nothing() {
    let body = sample_body();
    let mut chunks = vec![Vec::new()];
    for piece in body.chunks(11) {
        chunks.push(piece.to_vec());
        chunks.push(Vec::new());
    }
    assert_eq!(deltas(chunks), expected());
}

#[test]
fn test_done_in_middle_of_chunk_ends_stream() {
    let mut chunk = delta_line("first");
    chunk.push_str("data: [DONE]\n");
    chunk.push_str(&delta_line("after"));
    chunk.push_str("garbage \u{0} without newline");
    let out: Vec<_> = block_on(text_deltas(source(vec![chunk.into_bytes()])).collect());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].as_ref().unwrap(), "first");
}

#[test]
fn test_malformed_frame_between_deltas() {
    let mut body = delta_line("one");
    body.push_str("data: {bad json}\n\n");
    body.push_str(&delta_line("two"));
    let out: Vec<_> = block_on(text_deltas(source(vec![body.into_bytes()])).collect());
    let out: Vec<String> = out.into_iter().map(|r| r.expect("no error escapes")).collect();
    assert_eq!(out, vec!["one", "two"]);
}

#[test]
fn test_truncated_character_is_decode_error() {
    let mut body = delta_line("ok").into_bytes();
    body.extend_from_slice(b"data: \xe2\x82");
    let out: Vec<_> = block_on(text_deltas(source(vec![body])).collect());
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].as_ref().unwrap(), "ok");
    let err = out[1].as_ref().unwrap_err();
    assert!(err.is_decode());
    assert!(!err.is_transport());
}

#[test]
fn test_delta_before_invalid_byte_is_delivered() {
    let mut body = delta_line("A").into_bytes();
    body.push(0xff);
    let out: Vec<_> = block_on(text_deltas(source(vec![body])).collect());
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].as_ref().unwrap(), "A");
    assert!(out[1].as_ref().unwrap_err().is_decode());
}

#[test]
fn test_transport_error_is_distinguishable() {
    let chunks = vec![
        Ok(delta_line("partial").into_bytes()),
        Err(StreamError::Source("connection reset".to_string())),
    ];
    let out: Vec<_> = block_on(text_deltas(stream::iter(chunks)).collect());
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].as_ref().unwrap(), "partial");
    let err = out[1].as_ref().unwrap_err();
    assert!(err.is_transport());
    assert!(!err.is_decode());
}

#[test]
fn test_abandoning_stops_pulling() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let counter = pulls.clone();
    let mut remaining: Vec<Vec<u8>> = (0..100).map(|i| delta_line(&format!("chunk {i} ")).into_bytes()).collect();
    remaining.reverse();
    let counting_source = stream::poll_fn(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Poll::Ready(remaining.pop().map(Ok::<_, StreamError>))
    });

    let mut text = Box::pin(
        Pipeline::new(text_deltas(counting_source))
            .pipe(chars)
            .pipe(upper)
            .into_stream(),
    );
    assert_eq!(block_on(text.next()).unwrap().unwrap(), "C");
    assert_eq!(pulls.load(Ordering::SeqCst), 1);

    drop(text);
    assert_eq!(pulls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_wrapped_output_reconstructs_text() {
    let words = ["Streaming ", "text ", "arrives ", "in ", "small ", "pieces ", "and ", "is ", "wrapped ", "to ", "width."];
    let body: String = words.iter().map(|w| delta_line(w)).collect();
    let lines: Vec<String> = block_on(
        wrap_lines(text_deltas(source(vec![body.into_bytes()])), LineWrapper::new(16).unwrap())
            .map(Result::unwrap)
            .collect(),
    );
    for line in &lines {
        assert!(line.trim_end_matches('\n').chars().count() <= 16);
    }
    assert_eq!(lines.concat().replace('\n', " "), words.concat());
}

#[test]
fn test_hard_break_through_pipeline() {
    let body = delta_line(&"x".repeat(200));
    let lines: Vec<String> = block_on(
        PipelineOptions::default()
            .apply(text_deltas(source(vec![body.into_bytes()])))
            .unwrap()
            .map(Result::unwrap)
            .collect(),
    );
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], format!("{}\n", "x".repeat(80)));
    assert_eq!(lines[1], format!("{}\n", "x".repeat(80)));
    assert_eq!(lines[2], "x".repeat(40));
}
