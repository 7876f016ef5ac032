// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog node CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments first to get log level
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else if matches!(cli.command, Commands::Serve { .. }) {
        // A running node reports catalog changes at info
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "catalog-node".bold().green(), catalog_sync::VERSION);
            println!("Dynamic catalog synchronization");
            Ok(())
        }

        Commands::Serve { config, listen } => cli::handle_serve(config, listen),

        Commands::Catalogs { config, format } => cli::handle_catalogs(config, format),
    }
}
