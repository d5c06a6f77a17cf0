//! Request contract, configuration and command-line front end for stride.
//!
//! The main entry point is [`run`], which initialises logging, applies
//! `~/.stride/config.toml` to the environment and dispatches a CLI
//! command. Embedders can use [`RequestHandler`] directly.

#![deny(unsafe_code)]

pub mod cli;
mod commands;
pub mod config;
pub mod error;
pub mod handler;
pub mod request;
pub mod signals;

pub use error::{ErrorBody, RequestError};
pub use handler::{status_and_body, RequestHandler};
pub use request::{MatchRequest, MatchResponse, Mode, RawRequest, MAX_DISCOVERY_REQUESTS};
pub use signals::SignalClassifier;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use cli::{Cli, Commands};

/// Runs the `stride` command line.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    config::apply_config_to_env();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Recommend {
            request,
            catalogue,
            table,
            offline,
            compact,
        }) => commands::handle_recommend_command(request, catalogue, table, offline, compact),
        Some(Commands::Rank {
            request,
            catalogue,
            table,
            limit,
        }) => commands::handle_rank_command(request, catalogue, table, limit),
        Some(Commands::Catalogue { catalogue }) => commands::handle_catalogue_command(catalogue),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
