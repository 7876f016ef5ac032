// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog Sync - dynamic catalog synchronization for query engine clusters
//!
//! Connectors are added, updated or removed on a running cluster by writing
//! catalog definitions into a watch-capable coordination store. Every node
//! watches the same subtree and converges its active connectors onto it.
//!
//! # Features
//!
//! - **Single source of truth**: definitions live in the coordination store only
//! - **Event-driven convergence**: initial snapshot and live changes share one path
//! - **Partial-failure isolation**: a broken catalog never blocks the others
//! - **Capability announcement**: served connector ids are republished to discovery
//! - **Management API**: axum router for listing, saving and deleting definitions
//!
//! # Usage
//!
//! ```bash
//! # Start a node with its management API
//! catalog-node serve --config etc/node.properties --listen 127.0.0.1:8080
//!
//! # Add a catalog on every node
//! curl -X POST localhost:8080/v1/catalog -H 'content-type: application/json' \
//!   -d '{"catalogName":"sales","connectorName":"memory","properties":{"k":"v"}}'
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod connector;
pub mod discovery;
pub mod node;
pub mod store;

pub use api::{management_router, ApiError, CatalogResource};
pub use catalog::{
    CatalogDefinition, CatalogError, CatalogLifecycleManager, CatalogResult, LoadState,
    SyncContext, SyncStats, WatchEvent,
};
pub use config::SyncConfig;
pub use connector::{ConnectorId, ConnectorManager, ConnectorRegistry};
pub use discovery::CapabilityAnnouncer;
pub use node::CatalogSyncNode;
pub use store::{CoordinationStore, MemoryEnsemble, StoreType};

/// Catalog Sync version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog Sync crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
