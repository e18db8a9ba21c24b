//! Publishes one order message file to a running Orderflow consumer.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use orderflow_api::ingest;

/// Send a JSON order message to the Orderflow message feed.
#[derive(Parser, Debug)]
#[command(name = "orderflow-publish", version)]
struct Cli {
    /// File holding the message payload.
    file: PathBuf,

    /// Address of the consumer's message feed.
    #[arg(long, default_value = "127.0.0.1:4222")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let payload = tokio::fs::read(&cli.file)
        .await
        .map_err(|e| format!("cannot read {}: {e}", cli.file.display()))?;
    println!("Data: {}", String::from_utf8_lossy(&payload));

    ingest::publish(cli.addr.as_str(), &payload).await?;
    println!("Shipped to {}", cli.addr);

    Ok(())
}
