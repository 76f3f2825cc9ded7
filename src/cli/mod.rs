//! CLI module for bintrack
//!
//! Command-line interface for the exchange portfolio tracker. Uses clap for
//! argument parsing with one file per subcommand under `commands/`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};
use crate::logging::{init_logging, LogMode, LoggingConfig};

use commands::history::HistoryArgs;
use commands::init::InitArgs;
use commands::refresh::RefreshArgs;
use commands::reset::ResetArgs;
use commands::track::TrackArgs;
use commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "bintrack")]
#[command(version)]
#[command(about = "Exchange portfolio tracker with USD valuation and PnL history", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Exchange REST host
    #[arg(long, global = true, default_value = crate::exchange::client::DEFAULT_HOST)]
    pub host: String,

    /// Data directory path (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save API credentials for the signed account endpoint
    Init(InitArgs),

    /// Run one refresh tick and show the valued portfolio
    Refresh(RefreshArgs),

    /// Track continuously on a fixed refresh interval
    Track(TrackArgs),

    /// Show windowed portfolio or per-asset history with a summary
    History(HistoryArgs),

    /// Watch live prices for a set of symbols
    Watch(WatchArgs),

    /// Clear persisted snapshots and history
    Reset(ResetArgs),
}

impl Cli {
    /// Execute the parsed command
    pub async fn execute(self) -> Result<()> {
        let data_paths = DataPaths::new(&self.data_dir);

        // -v bumps the default filter; an explicit RUST_LOG still wins
        if self.verbose > 0 && std::env::var("RUST_LOG").is_err() {
            let level = if self.verbose > 1 { "trace" } else { "debug" };
            std::env::set_var("RUST_LOG", level);
        }

        let mode = match &self.command {
            // Keep the live displays clean; everything else logs to console too
            Commands::Track(_) | Commands::Watch(_) => LogMode::FileOnly,
            _ => LogMode::ConsoleAndFile,
        };
        init_logging(LoggingConfig::new(mode, data_paths.clone()))?;

        match self.command {
            Commands::Init(args) => commands::init::execute(data_paths, args).await,
            Commands::Refresh(args) => {
                commands::refresh::execute(&self.host, data_paths, args).await
            }
            Commands::Track(args) => commands::track::execute(&self.host, data_paths, args).await,
            Commands::History(args) => {
                commands::history::execute(&self.host, data_paths, args).await
            }
            Commands::Watch(args) => commands::watch::execute(&self.host, data_paths, args).await,
            Commands::Reset(args) => commands::reset::execute(data_paths, args).await,
        }
    }
}
