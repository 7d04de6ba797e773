//! CLI module for the SBRW utility
//!
//! Headless front-end over the same state machines the GUI drives.

mod commands;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::backend::{LocalBackend, SharedBackend};
use crate::config::AppPaths;

pub use output::OutputFormat;

/// SBRW Utility - set up and launch SoapBox Race World on Linux
#[derive(Parser, Debug)]
#[command(name = "sbrw-utility")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[command(flatten)]
    pub output: OutputOptions,

    /// Use this data directory instead of the per-user default
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Run a command instead of opening the window
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output formatting options
#[derive(Parser, Debug, Clone)]
pub struct OutputOptions {
    /// Output in JSON format (for machine parsing)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl OutputOptions {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether the game is installed and ready to launch
    Check,

    /// Install the game into a wine prefix
    Setup(commands::setup::SetupArgs),

    /// Launch the game
    Launch {
        /// Follow the game state until the game exits
        #[arg(long)]
        wait: bool,
    },

    /// Stop the running game
    Stop,

    /// Settings management
    Settings {
        #[command(subcommand)]
        command: commands::settings::SettingsCommands,
    },
}

/// Build the backend for a data directory override, or the default location
pub fn backend_for(data_dir: Option<PathBuf>) -> Result<SharedBackend> {
    let paths = match data_dir {
        Some(dir) => AppPaths::at(dir),
        None => AppPaths::discover()?,
    };
    Ok(Arc::new(LocalBackend::new(paths)))
}

/// Run the CLI with parsed arguments
pub async fn run(command: Commands, output: OutputOptions, backend: SharedBackend) -> Result<()> {
    let format = output.format();
    let quiet = output.quiet;

    match command {
        Commands::Check => commands::check::run(backend, format).await,
        Commands::Setup(args) => commands::setup::run(args, backend, format, quiet).await,
        Commands::Launch { wait } => commands::game::launch(backend, wait, format, quiet).await,
        Commands::Stop => commands::game::stop(backend, quiet).await,
        Commands::Settings { command } => {
            commands::settings::run(command, backend, format, quiet).await
        }
    }
}
