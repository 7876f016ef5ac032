// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers

use colored::Colorize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use super::commands::OutputFormat;
use super::output::CatalogFormatter;
use catalog_sync::{CatalogSyncNode, SyncConfig};

fn load_config(path: &Path) -> Result<SyncConfig, Box<dyn std::error::Error>> {
    SyncConfig::from_properties_file(path)
        .map_err(|e| format!("Failed to load {}: {}", path.display(), e).into())
}

/// Handle the serve command
///
/// Runs until Ctrl-C, or until the catalog watch is lost.
pub fn handle_serve(config: PathBuf, listen: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config, listen))
}

async fn serve(config: SyncConfig, listen: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let enabled = config.enabled;
    let node = CatalogSyncNode::from_config(config)?;
    node.start().await?;

    let listener = tokio::net::TcpListener::bind(listen).await?;
    println!(
        "{} node {} listening on {}",
        "catalog-node".bold().green(),
        node.node_id(),
        listen
    );
    if !enabled {
        println!(
            "{}",
            "Dynamic catalogs are disabled; management calls will be rejected".yellow()
        );
    }

    let server = axum::serve(listener, node.router()).with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {}", e);
        }
    });

    let engine = node.engine().clone();
    let watch = async move {
        if enabled {
            engine.join_watch().await
        } else {
            std::future::pending().await
        }
    };

    let outcome: Result<(), Box<dyn std::error::Error>> = tokio::select! {
        served = async { server.await } => served.map_err(Box::<dyn std::error::Error>::from),
        watched = watch => watched
            .map_err(|e| Box::<dyn std::error::Error>::from(format!("Catalog watch lost: {}", e))),
    };

    node.shutdown();
    let stats = node.engine().stats();
    log::info!(
        "Stopped after {} events ({} added, {} removed)",
        stats.events_applied,
        stats.catalogs_added,
        stats.catalogs_removed
    );
    outcome
}

/// Handle the catalogs command
pub fn handle_catalogs(
    config: PathBuf,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let definitions = runtime.block_on(async {
        let node = CatalogSyncNode::from_config(config)?;
        node.resource().list().await
    })?;

    print!("{}", CatalogFormatter::format(&definitions, format));
    Ok(())
}
