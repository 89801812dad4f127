// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category update producer.
//!
//! Periodically drains the category update queue and publishes a status
//! update for every ticket whose channel should change category.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use catmove_config::ProducerConfig;
use clap::{Parser, Subcommand};

/// Moves ticket channels between categories once their status settles.
#[derive(Parser, Debug)]
#[command(name = "category-update-producer", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this TOML file instead of the default search
    /// path. Environment variables still override it.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Run cycles on a schedule until SIGINT or SIGTERM (default).
    Run,
    /// Run a single cycle and exit.
    Once,
    /// Load and validate configuration, print the effective values and exit.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<ProducerConfig, Vec<catmove_config::ConfigError>> {
    match path {
        Some(path) => catmove_config::load_and_validate_path(path),
        None => catmove_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            catmove_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run::run_daemon(config).await,
        Commands::Once => run::run_single_cycle(config).await,
        Commands::CheckConfig => run::print_config(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
