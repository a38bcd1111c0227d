//! Stream a completion and print it wrapped to 80 columns.
//!
//! Run with:
//! ```bash
//! export ANTHROPIC_API_KEY="your-api-key"
//! echo "Write a haiku about Rust programming." | cargo run --example stream_demo
//! ```

use std::io::{Read, Write};

use futures::StreamExt;
use sseflow::client::{AnthropicClient, StreamingClient};
use sseflow::options::{MessageOptions, PipelineOptions, TransportOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .expect("ANTHROPIC_API_KEY environment variable must be set");

    println!("Enter your prompt (Ctrl+D when done):");
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let prompt = input.trim();
    if prompt.is_empty() {
        eprintln!("No prompt provided");
        std::process::exit(1);
    }

    let client = AnthropicClient::new(
        MessageOptions::default(),
        TransportOptions::new(api_key).with_timeout(std::time::Duration::from_secs(120)),
    );

    println!("\n--- Streaming response ---\n");

    let text = client.stream_text(prompt).await?;
    let mut lines = PipelineOptions::default().apply(text)?;

    while let Some(line) = lines.next().await {
        match line {
            Ok(line) => {
                print!("{}", line);
                std::io::stdout().flush()?;
            }
            Err(e) => {
                eprintln!("\nError in stream: {}", e);
                return Err(e.into());
            }
        }
    }

    println!("\n\n--- End of response ---");
    Ok(())
}
