//! Example: Resolving a Lanzou share link.
//!
//! Run with: cargo run --example resolve_link -- <share-url> [password]

use lanzou_resolver::{Lanzou, ResolveOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for debug output (optional)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: resolve_link <share-url> [password]"))?;

    let mut builder = ResolveOptions::builder(url).get_length(true);
    if let Some(password) = args.next() {
        builder = builder.password(password);
    }
    let options = builder.build();

    let client = Lanzou::builder()
        // Optionally add proxy:
        // .proxy("http://127.0.0.1:8080")
        .build()?;

    match client.resolve(&options).await {
        Ok(result) => {
            println!("Success!");
            println!("  url: {}", result.down_url);
            println!("  filename: {}", result.filename);
            println!("  filesize: {}", result.filesize);
            for warning in &result.warnings {
                println!("  warning: {}", warning);
            }
        }
        Err(e) => {
            println!("Failed ({}): {}", e.kind(), e);
        }
    }

    Ok(())
}
