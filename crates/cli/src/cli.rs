//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nav-replay - offline replay of flight logs through navigation filters
#[derive(Parser, Debug)]
#[command(
    name = "nav-replay",
    author,
    version,
    about = "Replay recorded flight logs through navigation filters",
    long_about = "Replays inertial, position-fix and reference streams from a flight log \n\
                  through one or more navigation filters, keeping the streams causally \n\
                  aligned, and compares the resulting solutions and run times."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "NAV_REPLAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "NAV_REPLAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a flight log through the configured filters
    Run(RunArgs),

    /// Validate a run file without replaying
    Validate(ValidateArgs),

    /// Display run file information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to run file (TOML or JSON)
    #[arg(short, long, default_value = "replay.toml", env = "NAV_REPLAY_CONFIG")]
    pub config: PathBuf,

    /// Override the flight log path
    #[arg(short, long, env = "NAV_REPLAY_INPUT")]
    pub input: Option<PathBuf>,

    /// Override the replay window start (s)
    #[arg(long, env = "NAV_REPLAY_START", allow_negative_numbers = true)]
    pub start: Option<f64>,

    /// Override the replay window end (s)
    #[arg(long, env = "NAV_REPLAY_END", allow_negative_numbers = true)]
    pub end: Option<f64>,

    /// Drop fix samples after this time (s)
    #[arg(long, env = "NAV_REPLAY_FIX_CUTOFF")]
    pub fix_cutoff: Option<f64>,

    /// Run filters concurrently
    #[arg(long, env = "NAV_REPLAY_CONCURRENT")]
    pub concurrent: bool,

    /// Let the reference cursor catch up with the inertial clock
    #[arg(long, env = "NAV_REPLAY_CATCH_UP")]
    pub catch_up: bool,

    /// Replay a synthetic flight instead of a log file
    #[arg(long, env = "NAV_REPLAY_MOCK")]
    pub mock: bool,

    /// Synthetic flight length (s)
    #[arg(long, default_value = "60", env = "NAV_REPLAY_MOCK_DURATION")]
    pub mock_duration: f64,

    /// Validate configuration and exit without replaying
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "NAV_REPLAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to run file to validate
    #[arg(short, long, default_value = "replay.toml", env = "NAV_REPLAY_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to run file
    #[arg(short, long, default_value = "replay.toml", env = "NAV_REPLAY_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show filter tuning parameters
    #[arg(long)]
    pub filters: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
