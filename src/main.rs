//! sentiment-service - sentiment inference over HTTP or the command line
//!
//! Usage:
//!   sentiment-service serve                    Start the HTTP API
//!   sentiment-service serve --port 9000        Start on a specific port
//!   sentiment-service predict "text" ...       Score texts and print a table
//!   sentiment-service predict "text" --json    Score texts as JSON
//!   sentiment-service --help                   Show all commands

use anyhow::Result;
use clap::Parser;

use sentiment_service::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr so `predict --json` stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sentiment_service=info".parse()?),
        )
        .init();

    run(cli).await
}
