//! CLI interface for the sentiment service.

pub mod handlers;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{load_settings, Settings};
use crate::init::AppContext;
use output::OutputMode;

/// Sentiment inference service
#[derive(Debug, Parser)]
#[command(name = "sentiment-service", version, about, long_about = None)]
pub struct Cli {
    /// Settings file (default: ./sentiment.toml, then the user config dir)
    #[arg(long, env = "SENTIMENT_BACKEND_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind (overrides settings)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides settings)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Score one or more texts and print the results
    Predict {
        /// Texts to score
        #[arg(required = true)]
        texts: Vec<String>,
        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Commands::Serve { host, port } = self {
            if let Some(host) = host {
                settings.server.host = host.clone();
            }
            if let Some(port) = port {
                settings.server.port = *port;
            }
        }
    }
}

/// Load settings, build the application context and run the command.
pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings(cli.config.as_deref())?;
    cli.command.apply_to(&mut settings);

    let ctx = AppContext::new(settings)?;

    match &cli.command {
        Commands::Serve { .. } => crate::http::serve(ctx).await?,
        Commands::Predict { texts, json } => {
            handlers::predict::handle_predict(&ctx, texts, OutputMode::from_json_flag(*json))?
        }
    }

    Ok(())
}
