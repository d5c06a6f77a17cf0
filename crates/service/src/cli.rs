use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ENV_CATALOGUE, ENV_SCORING_TABLE};

/// Command-line interface for the `stride` application.
#[derive(Debug, Parser)]
#[command(
    name = "stride",
    about = "Running-shoe matcher: rotation gaps, scored retrieval and diverse picks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available `stride` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Handles one JSON request (gap_detection, discovery or analysis) and prints the JSON response.
    Recommend {
        /// Request file, or `-` for stdin.
        #[arg(long, value_name = "FILE|-")]
        request: PathBuf,
        /// Shoe catalogue (JSON, YAML or TOML).
        #[arg(long, env = ENV_CATALOGUE, value_name = "PATH")]
        catalogue: Option<PathBuf>,
        /// Scoring-table override (TOML).
        #[arg(long, env = ENV_SCORING_TABLE, value_name = "PATH")]
        table: Option<PathBuf>,
        /// Skips text generation; every shoe gets fallback bullets.
        #[arg(long, default_value_t = false)]
        offline: bool,
        /// Prints single-line JSON.
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
    /// Shows the scored candidate ranking for an analysis request.
    Rank {
        /// Request file, or `-` for stdin.
        #[arg(long, value_name = "FILE|-")]
        request: PathBuf,
        #[arg(long, env = ENV_CATALOGUE, value_name = "PATH")]
        catalogue: Option<PathBuf>,
        #[arg(long, env = ENV_SCORING_TABLE, value_name = "PATH")]
        table: Option<PathBuf>,
        /// Number of candidates to show.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Validates a catalogue and summarises it.
    Catalogue {
        #[arg(long, env = ENV_CATALOGUE, value_name = "PATH")]
        catalogue: Option<PathBuf>,
    },
}
