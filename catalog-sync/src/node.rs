// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node wiring
//!
//! Builds the context one node runs with: coordination store handle,
//! connector registry, discovery announcer and the synchronization engine on
//! top of them, plus the management router sharing the same store.

use crate::api::{management_router, CatalogResource};
use crate::catalog::{CatalogLifecycleManager, CatalogResult, SyncContext};
use crate::config::SyncConfig;
use crate::connector::ConnectorRegistry;
use crate::discovery::{
    CapabilityAnnouncer, MemoryAnnouncer, MemoryNodeManager, ServiceAnnouncement,
};
use crate::store::{create_coordination_store, CoordinationStore};
use axum::Router;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct CatalogSyncNode {
    node_id: Uuid,
    config: Arc<SyncConfig>,
    store: Arc<dyn CoordinationStore>,
    connectors: Arc<ConnectorRegistry>,
    announcer: Arc<MemoryAnnouncer>,
    node_manager: Arc<MemoryNodeManager>,
    capability: Arc<CapabilityAnnouncer>,
    engine: Arc<CatalogLifecycleManager>,
    resource: Arc<CatalogResource>,
}

impl CatalogSyncNode {
    /// Validate `config` and connect to the configured coordination store
    pub fn from_config(config: SyncConfig) -> CatalogResult<Self> {
        config.validate()?;
        let store = create_coordination_store(&config)?;
        Ok(Self::with_store(config, store))
    }

    /// Build a node on an existing store handle, e.g. one client of a shared ensemble
    pub fn with_store(config: SyncConfig, store: Arc<dyn CoordinationStore>) -> Self {
        let node_id = Uuid::new_v4();
        let config = Arc::new(config);

        let mut properties = BTreeMap::new();
        properties.insert("node_id".to_string(), node_id.to_string());
        let announcer = Arc::new(MemoryAnnouncer::with_announcements(vec![
            ServiceAnnouncement::new(config.service_type.clone(), properties),
        ]));
        let node_manager = Arc::new(MemoryNodeManager::new());
        let capability = Arc::new(CapabilityAnnouncer::new(
            config.service_type.clone(),
            announcer.clone(),
            node_manager.clone(),
        ));
        let connectors = Arc::new(ConnectorRegistry::new());

        let engine = Arc::new(CatalogLifecycleManager::new(SyncContext {
            config: config.clone(),
            store: store.clone(),
            connectors: connectors.clone(),
            announcer: capability.clone(),
        }));
        let resource = Arc::new(CatalogResource::new(config.clone(), store.clone()));

        log::debug!("Created catalog sync node {}", node_id);
        Self {
            node_id,
            config,
            store,
            connectors,
            announcer,
            node_manager,
            capability,
            engine,
            resource,
        }
    }

    /// Start synchronizing if the feature is enabled
    pub async fn start(&self) -> CatalogResult<()> {
        if !self.config.enabled {
            log::info!("Dynamic catalogs are disabled on node {}", self.node_id);
            return Ok(());
        }
        self.engine.load_all().await
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    /// Management router backed by this node's store handle
    pub fn router(&self) -> Router {
        management_router(self.resource.clone())
    }

    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<CatalogLifecycleManager> {
        &self.engine
    }

    pub fn store(&self) -> &Arc<dyn CoordinationStore> {
        &self.store
    }

    pub fn resource(&self) -> &Arc<CatalogResource> {
        &self.resource
    }

    pub fn connectors(&self) -> &Arc<ConnectorRegistry> {
        &self.connectors
    }

    pub fn announcer(&self) -> &Arc<MemoryAnnouncer> {
        &self.announcer
    }

    pub fn node_manager(&self) -> &Arc<MemoryNodeManager> {
        &self.node_manager
    }

    pub fn capability(&self) -> &Arc<CapabilityAnnouncer> {
        &self.capability
    }
}
