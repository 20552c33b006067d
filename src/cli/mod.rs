//! CLI module for Barrage
//!
//! Command-line surface for the load harness. There are no subcommands: the
//! process starts firing immediately and runs until SIGINT/SIGTERM or the
//! dashboard's quit key.
//!
//! # Example
//!
//! ```bash
//! # One bot, one request per second
//! barrage --api http://localhost:8501/v1/models/mnist:predict --data mnist.csv
//!
//! # Five bots at 2-second intervals, persisting response bodies
//! barrage --api http://localhost:9000/predict --bots 5 --interval 2 \
//!     --data samples.json --save-responses
//! ```

pub mod output;
pub mod run;

use clap::Parser;
use std::path::PathBuf;

/// Barrage - load-generation harness for HTTP inference endpoints
#[derive(Parser, Debug)]
#[command(
    name = "barrage",
    version,
    about = "Fire synthetic inference requests at an HTTP endpoint and watch live metrics"
)]
pub struct Cli {
    /// API endpoint URL (required unless set in the config file or
    /// BARRAGE_API)
    #[arg(long, env = "BARRAGE_API")]
    pub api: Option<String>,

    /// Number of concurrent bots
    #[arg(long, env = "BARRAGE_BOTS")]
    pub bots: Option<usize>,

    /// Interval between requests per bot, in seconds
    #[arg(long, env = "BARRAGE_INTERVAL")]
    pub interval: Option<u64>,

    /// Path to the sample data file (.json selects JSON, otherwise CSV)
    #[arg(long, env = "BARRAGE_DATA")]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "barrage.toml")]
    pub config: PathBuf,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BARRAGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Disable the terminal dashboard and log periodic snapshots instead
    #[arg(long)]
    pub headless: bool,

    /// Append successful response bodies to the results log
    #[arg(long)]
    pub save_responses: bool,
}
