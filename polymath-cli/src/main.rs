//! Polymath CLI — explore connections between research topics.
//!
//! Provides one-shot research commands and the REST server mode.

mod commands;
mod render;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Polymath: multidisciplinary research explorer
#[derive(Parser, Debug)]
#[command(name = "polymath", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the REST API server
    Serve {
        /// Override the configured listen host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Research the connection between two topics
    Research {
        /// Primary topic
        primary: String,
        /// Topic to connect it with
        intent: String,
        /// Topics from earlier rounds, in order
        #[arg(long)]
        previous: Vec<String>,
        /// Write the structured result to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extend an existing topic chain with one more topic
    Continue {
        /// The chain so far (at least the first two topics)
        #[arg(required = true, num_args = 2..)]
        topics: Vec<String>,
        /// Topic to append
        #[arg(short, long)]
        next: String,
        /// Write the structured result to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Suggest related topics for a chain
    Related {
        /// One or more topics
        #[arg(required = true)]
        topics: Vec<String>,
    },
    /// Generate a node/edge mind map for a topic chain
    MindMap {
        /// Primary topic
        primary: String,
        /// Connected topics
        #[arg(required = true)]
        secondary: Vec<String>,
        /// Write the mind map to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Write a default polymath.toml in the current directory
    Init,
    /// Show the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = polymath_core::load_config(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    commands::handle_command(cli.command, config).await
}
