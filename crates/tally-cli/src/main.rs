//! Command-line round driver for Tally
//!
//! Loads a round file (starting snapshot plus candidate batch), runs the
//! selector over it and prints the result as JSON on stdout. Logs go to
//! stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod round;

use config::CliConfig;
use round::RoundFile;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally - fee-maximizing UTXO round admission", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "tally.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Select and apply the best chain for a round
    Select {
        /// Round file (JSON)
        round: PathBuf,
    },

    /// Check every candidate against the starting snapshot
    Validate {
        /// Round file (JSON)
        round: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Select { round } => {
            let config = CliConfig::load(&cli.config)?;
            let round = RoundFile::load(&round)?;
            let report = round.select(config.selector)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Validate { round } => {
            let round = RoundFile::load(&round)?;
            let verdicts = round.verdicts();
            println!("{}", serde_json::to_string_pretty(&verdicts)?);
        }
    }

    Ok(())
}
