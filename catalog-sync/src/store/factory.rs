// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Coordination store factory
//!
//! Creates the coordination store client configured for this node.

use super::traits::CoordinationStore;
use super::types::{StoreResult, StoreType};
use crate::config::SyncConfig;
use std::sync::Arc;

/// Create the coordination store client described by `config`
///
/// The namespace isolates this engine's data from other users of the same
/// coordination service. For the embedded sled backend the configured
/// address is the database directory.
///
/// # Examples
/// ```ignore
/// let config = SyncConfig { store_type: StoreType::Memory, ..SyncConfig::default() };
/// let store = create_coordination_store(&config)?;
/// store.create_or_set("/catalog/meta/sales", b"{}").await?;
/// ```
pub fn create_coordination_store(config: &SyncConfig) -> StoreResult<Arc<dyn CoordinationStore>> {
    log::info!(
        "Connecting to {} coordination store, address: {}, namespace: {}",
        config.store_type,
        config.address,
        config.namespace
    );
    match config.store_type {
        StoreType::Memory => {
            use crate::store::memory::MemoryCoordinationStore;
            Ok(Arc::new(MemoryCoordinationStore::new(&config.namespace)))
        }
        #[cfg(feature = "sled-backend")]
        StoreType::Sled => {
            use crate::store::sled::SledCoordinationStore;
            let store = SledCoordinationStore::open(&config.address, &config.namespace)?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sled-backend"))]
        StoreType::Sled => Err(super::types::StoreError::Backend(
            "sled coordination store requires the sled-backend feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_memory_store() {
        let config = SyncConfig {
            store_type: StoreType::Memory,
            ..SyncConfig::default()
        };
        let store = create_coordination_store(&config).unwrap();
        assert_eq!(store.store_type(), StoreType::Memory);
    }

    #[cfg(feature = "sled-backend")]
    #[test]
    fn test_create_sled_store() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = SyncConfig {
            store_type: StoreType::Sled,
            address: temp_dir.path().to_string_lossy().to_string(),
            ..SyncConfig::default()
        };
        let store = create_coordination_store(&config).unwrap();
        assert_eq!(store.store_type(), StoreType::Sled);
    }

    #[test]
    fn test_unknown_store_type() {
        assert!("zookeeper".parse::<StoreType>().is_err());
        assert_eq!("MEMORY".parse::<StoreType>(), Ok(StoreType::Memory));
    }
}
