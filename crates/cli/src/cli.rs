//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Digi Writer - event-record output stage for detector digitization
#[derive(Parser, Debug)]
#[command(
    name = "digi-writer",
    author,
    version,
    about = "Detector digitization output pipeline",
    long_about = "The output stage of a particle-detector digitization pipeline.\n\n\
                  Creates the configured output collections once per run, converts \n\
                  per-event simulation records into them, and commits each event \n\
                  atomically to a rotating sequence of output files."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "DIGI_WRITER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "DIGI_WRITER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the output pipeline on generated events
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "DIGI_WRITER_CONFIG")]
    pub config: PathBuf,

    /// Override event count from configuration (0 = use configuration)
    #[arg(long, default_value = "0", env = "DIGI_WRITER_EVENTS")]
    pub events: u64,

    /// Override output directory from configuration
    #[arg(long, env = "DIGI_WRITER_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Minimum deposit energy accepted by the conversion predicate (GeV)
    #[arg(long, env = "DIGI_WRITER_MIN_ENERGY")]
    pub min_energy: Option<f64>,

    /// Validate configuration and exit without running the pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "DIGI_WRITER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show declared collections
    #[arg(long)]
    pub collections: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
