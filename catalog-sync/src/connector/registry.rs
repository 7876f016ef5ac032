// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connector registry implementation
//!
//! This module provides the ConnectorRegistry that holds every registered
//! connector factory and the connectors instantiated from them. It is the
//! in-process [`ConnectorManager`] the synchronization engine drives.

use super::error::{ConnectorError, ConnectorResult};
use super::providers;
use super::traits::{Connector, ConnectorFactory, ConnectorId, ConnectorManager};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Central registry for connector factories and live connectors
pub struct ConnectorRegistry {
    /// Map of connector name to factory
    factories: HashMap<String, Arc<dyn ConnectorFactory>>,
    /// Map of catalog name to its live connector
    connectors: Mutex<HashMap<String, Box<dyn Connector>>>,
    created: AtomicU64,
    dropped: AtomicU64,
}

impl ConnectorRegistry {
    /// Create a registry with all built-in connector factories registered
    pub fn new() -> Self {
        let mut registry = Self::empty();
        providers::register_all_connectors(&mut registry);
        registry
    }

    /// Create a registry without any factories
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            connectors: Mutex::new(HashMap::new()),
            created: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Register a connector factory under its own name
    ///
    /// A factory registered later under the same name replaces the earlier one.
    pub fn register(&mut self, factory: Arc<dyn ConnectorFactory>) {
        let name = factory.name().to_string();
        if self.factories.insert(name.clone(), factory).is_some() {
            log::warn!("Connector factory '{}' replaced", name);
        }
        log::info!("Registered connector factory: {}", name);
    }

    /// Names of all registered connector factories, sorted
    pub fn connector_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of all catalogs with a live connector, sorted
    pub fn catalog_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connectors.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Connector implementation backing `catalog_name`, if any
    pub fn connector_of(&self, catalog_name: &str) -> Option<String> {
        self.connectors
            .lock()
            .get(catalog_name)
            .map(|connector| connector.connector_name().to_string())
    }

    /// Number of connectors created over the registry lifetime
    pub fn created_count(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Number of connectors dropped over the registry lifetime
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectorManager for ConnectorRegistry {
    async fn create_catalog(
        &self,
        catalog_name: &str,
        connector_name: &str,
        properties: &BTreeMap<String, String>,
    ) -> ConnectorResult<ConnectorId> {
        let factory = self
            .factories
            .get(connector_name)
            .cloned()
            .ok_or_else(|| ConnectorError::UnknownConnector(connector_name.to_string()))?;

        if self.connectors.lock().contains_key(catalog_name) {
            return Err(ConnectorError::CatalogAlreadyExists(catalog_name.to_string()));
        }

        // Built outside the lock; a concurrent create for the same name loses below
        let connector = factory.create(catalog_name, properties)?;

        let mut connectors = self.connectors.lock();
        if connectors.contains_key(catalog_name) {
            drop(connectors);
            if let Err(e) = connector.shutdown() {
                log::warn!("Failed to shut down duplicate connector '{}': {}", catalog_name, e);
            }
            return Err(ConnectorError::CatalogAlreadyExists(catalog_name.to_string()));
        }
        connectors.insert(catalog_name.to_string(), connector);
        self.created.fetch_add(1, Ordering::Relaxed);

        Ok(ConnectorId::new(catalog_name))
    }

    /// A connector whose shutdown fails is put back, so the catalog stays
    /// registered exactly when the caller sees an error.
    async fn drop_catalog(&self, catalog_name: &str) -> ConnectorResult<()> {
        let Some(connector) = self.connectors.lock().remove(catalog_name) else {
            log::debug!("No connector for catalog '{}', nothing to drop", catalog_name);
            return Ok(());
        };

        if let Err(e) = connector.shutdown() {
            self.connectors
                .lock()
                .entry(catalog_name.to_string())
                .or_insert(connector);
            return Err(match e {
                ConnectorError::ShutdownFailed(_) => e,
                other => ConnectorError::ShutdownFailed(format!(
                    "catalog '{}': {}",
                    catalog_name, other
                )),
            });
        }
        self.dropped.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
