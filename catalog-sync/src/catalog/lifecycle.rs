// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog lifecycle manager
//!
//! The single consumer of catalog watch events on a node. It turns each event
//! into connector create/drop calls, keeps the [`ActiveCatalogSet`] in step
//! and republishes the node's connector ids.
//!
//! # Event handling
//!
//! ```text
//! Added(path, bytes)        -> decode -> create connector -> insert -> announce
//! Removed(path, _)          -> drop connector -> remove -> withdraw
//! Updated(path, old, new)   -> Removed(path, old) then Added(path, new)
//! ```
//!
//! Errors never escape event handling. They are logged and counted, and the
//! next event is processed as usual, so one broken catalog cannot hold back
//! the rest.

use super::active::ActiveCatalogSet;
use super::codec;
use super::definition::CatalogDefinition;
use super::error::{CatalogError, CatalogResult};
use super::watch::{CatalogWatchDispatcher, WatchEvent};
use crate::config::SyncConfig;
use crate::connector::{ConnectorId, ConnectorManager};
use crate::discovery::CapabilityAnnouncer;
use crate::store::{path, CoordinationStore};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Collaborators the engine is constructed with
#[derive(Clone)]
pub struct SyncContext {
    pub config: Arc<SyncConfig>,
    pub store: Arc<dyn CoordinationStore>,
    pub connectors: Arc<dyn ConnectorManager>,
    pub announcer: Arc<CapabilityAnnouncer>,
}

/// One-shot latch guarding the initial bulk load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    NotStarted,
    Loading,
    Loaded,
}

impl LoadState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LoadState::Loading,
            2 => LoadState::Loaded,
            _ => LoadState::NotStarted,
        }
    }
}

/// Counters describing what the engine has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub events_applied: u64,
    pub catalogs_added: u64,
    pub catalogs_removed: u64,
    pub ignored_events: u64,
    pub decode_failures: u64,
    pub connector_failures: u64,
    pub announcement_failures: u64,
}

/// Converges the node's active catalogs onto the coordination store contents
pub struct CatalogLifecycleManager {
    context: SyncContext,
    active: ActiveCatalogSet,
    load_state: AtomicU8,
    stats: Mutex<SyncStats>,
    shutdown: watch::Sender<bool>,
    watch_task: Mutex<Option<JoinHandle<CatalogResult<()>>>>,
}

impl CatalogLifecycleManager {
    pub fn new(context: SyncContext) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            context,
            active: ActiveCatalogSet::new(),
            load_state: AtomicU8::new(LoadState::NotStarted as u8),
            stats: Mutex::new(SyncStats::default()),
            shutdown,
            watch_task: Mutex::new(None),
        }
    }

    /// Subscribe to the catalog subtree and start consuming its events
    ///
    /// Only the first call does anything; later calls, concurrent or not,
    /// return `Ok(())` immediately. The call returns once the subscription is
    /// established, without waiting for the initial snapshot to be applied.
    /// If subscribing fails the latch is released so a later call can retry.
    pub async fn load_all(self: &Arc<Self>) -> CatalogResult<()> {
        self.context.config.ensure_enabled()?;

        if self
            .load_state
            .compare_exchange(
                LoadState::NotStarted as u8,
                LoadState::Loading as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            log::debug!("Catalog load already {:?}, skipping", self.load_state());
            return Ok(());
        }

        let root = self.context.config.root_path.clone();
        log::info!("Loading catalogs from '{}'", root);

        let subscription = match self.context.store.subscribe(&root).await {
            Ok(subscription) => subscription,
            Err(e) => {
                self.load_state.store(LoadState::NotStarted as u8, Ordering::Release);
                log::error!("Failed to watch catalog subtree '{}': {}", root, e);
                return Err(e.into());
            }
        };

        let (sender, receiver) = mpsc::channel(self.context.config.event_buffer);
        let dispatcher = CatalogWatchDispatcher::new(subscription, sender);
        let watch_task = tokio::spawn(async move {
            let outcome = dispatcher.run().await;
            if let Err(e) = &outcome {
                log::error!("Catalog watch on '{}' stopped: {}", root, e);
            }
            outcome
        });
        *self.watch_task.lock() = Some(watch_task);

        let manager = Arc::clone(self);
        let shutdown = self.shutdown.subscribe();
        tokio::spawn(async move { manager.consume(receiver, shutdown).await });

        self.load_state.store(LoadState::Loaded as u8, Ordering::Release);
        Ok(())
    }

    async fn consume(
        &self,
        mut events: mpsc::Receiver<WatchEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => continue,
                event = events.recv() => match event {
                    Some(event) => self.on_event(event).await,
                    None => break,
                },
            }
        }
        log::info!("Catalog event consumer stopped");
    }

    /// Apply one watch event
    pub async fn on_event(&self, event: WatchEvent) {
        match event {
            WatchEvent::Added { path, data } => self.add_catalog(&path, &data).await,
            WatchEvent::Removed { path, data } => self.remove_catalog(&path, &data).await,
            WatchEvent::Updated {
                path,
                old_data,
                data,
            } => {
                self.remove_catalog(&path, &old_data).await;
                self.add_catalog(&path, &data).await;
            }
        }
        self.stats.lock().events_applied += 1;
    }

    async fn add_catalog(&self, node: &str, data: &[u8]) {
        let Some(catalog_name) = self.catalog_name_for(node) else {
            return;
        };

        let definition = match codec::decode(data) {
            Ok(definition) => definition,
            Err(e) => {
                log::warn!("Ignoring catalog definition at '{}': {}", node, e);
                self.stats.lock().decode_failures += 1;
                return;
            }
        };
        if definition.catalog_name() != catalog_name {
            log::warn!(
                "Ignoring catalog definition at '{}': it names catalog '{}'",
                node,
                definition.catalog_name()
            );
            self.stats.lock().decode_failures += 1;
            return;
        }

        if let Some(existing) = self.active.get(&catalog_name) {
            if existing.definition == definition {
                log::debug!("Catalog {} is already active with this definition", catalog_name);
                return;
            }
            self.teardown(&catalog_name).await;
            if self.active.contains(&catalog_name) {
                return;
            }
        }

        log::info!("Adding catalog {}", catalog_name);
        let created = self
            .context
            .connectors
            .create_catalog(
                definition.catalog_name(),
                definition.connector_name(),
                definition.properties(),
            )
            .await;
        let connector_id = match created {
            Ok(connector_id) => connector_id,
            Err(e) => {
                log::error!(
                    "Failed to add catalog {} using connector {}: {}",
                    catalog_name,
                    definition.connector_name(),
                    e
                );
                self.stats.lock().connector_failures += 1;
                return;
            }
        };

        let connector_name = definition.connector_name().to_string();
        self.active.insert(definition, connector_id.clone());
        self.stats.lock().catalogs_added += 1;
        log::info!("Added catalog {} using connector {}", catalog_name, connector_name);

        if let Err(e) = self.context.announcer.announce(&connector_id).await {
            log::error!("Failed to announce connector '{}': {}", connector_id, e);
            self.stats.lock().announcement_failures += 1;
        }
    }

    /// The stored bytes are informational only; the catalog is found by path
    async fn remove_catalog(&self, node: &str, _data: &[u8]) {
        if let Some(catalog_name) = self.catalog_name_for(node) {
            self.teardown(&catalog_name).await;
        }
    }

    async fn teardown(&self, catalog_name: &str) {
        log::info!("Removing catalog {}", catalog_name);
        if let Err(e) = self.context.connectors.drop_catalog(catalog_name).await {
            log::error!("Failed to remove catalog {}: {}", catalog_name, e);
            self.stats.lock().connector_failures += 1;
            return;
        }

        let Some(removed) = self.active.remove(catalog_name) else {
            log::debug!("Catalog {} was not active", catalog_name);
            return;
        };
        self.stats.lock().catalogs_removed += 1;
        log::info!(
            "Removed catalog {} (active since {})",
            catalog_name,
            removed.activated_at.to_rfc3339()
        );

        if let Err(e) = self.context.announcer.withdraw(&removed.connector_id).await {
            log::error!("Failed to withdraw connector '{}': {}", removed.connector_id, e);
            self.stats.lock().announcement_failures += 1;
        }
    }

    fn catalog_name_for(&self, node: &str) -> Option<String> {
        let name = catalog_name_from_path(&self.context.config.root_path, node);
        if name.is_none() {
            log::debug!("Ignoring event for '{}': not a catalog node", node);
            self.stats.lock().ignored_events += 1;
        }
        name
    }

    /// Stop consuming events and tear the subscription down
    ///
    /// Active connectors are left as they are.
    pub fn shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            log::info!("Shutting down catalog synchronization");
        }
    }

    /// Wait for the watch to end and report why it ended
    ///
    /// # Returns
    /// * `Ok(())` if no watch was started or it ended through [`Self::shutdown`]
    /// * `Err(CatalogError::WatchTerminated)` if the store connection was lost
    pub async fn join_watch(&self) -> CatalogResult<()> {
        let task = self.watch_task.lock().take();
        match task {
            Some(task) => task
                .await
                .map_err(|e| CatalogError::WatchTerminated(e.to_string()))?,
            None => Ok(()),
        }
    }

    /// Sorted names of the catalogs this node currently serves
    pub fn active_catalogs(&self) -> Vec<String> {
        self.active.names()
    }

    pub fn connector_id(&self, catalog_name: &str) -> Option<ConnectorId> {
        self.active.get(catalog_name).map(|entry| entry.connector_id)
    }

    pub fn definition(&self, catalog_name: &str) -> Option<CatalogDefinition> {
        self.active.get(catalog_name).map(|entry| entry.definition)
    }

    pub fn load_state(&self) -> LoadState {
        LoadState::from_u8(self.load_state.load(Ordering::Acquire))
    }

    pub fn stats(&self) -> SyncStats {
        *self.stats.lock()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.context.config
    }
}

/// Catalog name addressed by `node`, if it is a direct child of `root`
///
/// The root itself and anything nested deeper is not a catalog.
pub fn catalog_name_from_path(root: &str, node: &str) -> Option<String> {
    path::direct_child_name(root, node).map(str::to_string)
}
