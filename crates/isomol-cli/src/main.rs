mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::setup(cli.verbose, cli.quiet, cli.log_file.as_deref())?;
    debug!(?cli, "Parsed command line.");

    if let Some(threads) = cli.threads {
        info!(threads, "Configuring global thread pool.");
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| CliError::Argument(format!("failed to build thread pool: {e}")))?;
    }

    let result = match cli.command {
        Commands::Mesh(args) => commands::mesh::run(args),
        Commands::Bonds(args) => commands::bonds::run(args),
        Commands::Info(args) => commands::info::run(args),
    };

    if let Err(error) = &result {
        error!(%error, "Command failed.");
    }
    result
}
