use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_core::SiteConfig;

mod commands;
mod scenario;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Replay scroll scenarios against the folio page behaviour")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.config/folio/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file and print every presentation change
    Simulate {
        /// Scenario TOML file
        scenario: PathBuf,
        /// Emit one JSON object per change
        #[arg(long)]
        json: bool,
        /// Sleep between steps instead of running on virtual time only
        #[arg(long)]
        realtime: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => SiteConfig::load_from(path)?,
        None => SiteConfig::load()?,
    };

    match cli.command {
        Commands::Simulate {
            scenario,
            json,
            realtime,
        } => commands::simulate::run(&scenario, &config, json, realtime).await,
        Commands::Config { init } => commands::config::run(&config, init).await,
    }
}
