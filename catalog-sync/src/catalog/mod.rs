// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dynamic catalog synchronization engine
//!
//! Every node watches the same coordination store subtree and converges its
//! local set of active connectors onto it.
//!
//! # Architecture
//!
//! ```text
//! CoordinationStore subscription
//!     ↓ raw notifications
//! CatalogWatchDispatcher (classify, drop root)
//!     ↓ bounded channel of WatchEvent
//! CatalogLifecycleManager (single consumer)
//!     ↓                      ↓
//! ConnectorManager      CapabilityAnnouncer
//! ```

pub mod active;
pub mod codec;
pub mod definition;
pub mod error;
pub mod lifecycle;
pub mod watch;

pub use active::{ActiveCatalog, ActiveCatalogSet};
pub use definition::{validate_catalog_name, CatalogDefinition, CatalogDefinitionRequest};
pub use error::{CatalogError, CatalogResult};
pub use lifecycle::{
    catalog_name_from_path, CatalogLifecycleManager, LoadState, SyncContext, SyncStats,
};
pub use watch::{CatalogWatchDispatcher, WatchEvent};
