//! Compose stages over a simulated source: split into characters, upper-case,
//! then type them out slowly.
//!
//! Run with:
//! ```bash
//! cargo run --example generator_composition
//! ```

use std::io::Write;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use sseflow::error::StreamError;
use sseflow::pipeline::Pipeline;
use sseflow::stages::{chars, paced, upper};

/// Add a delay between characters for effect.
fn slow_type<S>(chars: S) -> impl Stream<Item = Result<String, StreamError>>
where
    S: Stream<Item = Result<String, StreamError>>,
{
    paced(chars, Duration::from_millis(50))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Streaming characters:\n");

    // Simulated network source
    let source = stream::iter(["hello", "world", "from", "async", "streams"]).then(|word| async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, StreamError>(format!("{word} "))
    });

    let pipeline = Pipeline::new(source)
        .pipe(chars)
        .pipe(upper)
        .pipe(slow_type)
        .into_stream();
    futures::pin_mut!(pipeline);

    while let Some(c) = pipeline.next().await {
        print!("{}", c?);
        std::io::stdout().flush()?;
    }

    println!("\n\nDone!");
    Ok(())
}
