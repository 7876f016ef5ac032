// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cluster service-discovery collaborators
//!
//! A node publishes a set of [`ServiceAnnouncement`]s through an [`Announcer`];
//! other nodes learn about it once their [`NodeManager`] refreshes its view.
//! The in-memory implementations record what was broadcast so tests and the
//! single-process node can inspect it.

use crate::catalog::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use uuid::Uuid;

/// One service record advertised by a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAnnouncement {
    id: Uuid,
    service_type: String,
    properties: BTreeMap<String, String>,
}

impl ServiceAnnouncement {
    pub fn new(service_type: impl Into<String>, properties: BTreeMap<String, String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_type: service_type.into(),
            properties,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Copy of this announcement with one property replaced, under a fresh id
    pub fn with_property(&self, key: &str, value: impl Into<String>) -> Self {
        let mut properties = self.properties.clone();
        properties.insert(key.to_string(), value.into());
        Self::new(self.service_type.clone(), properties)
    }
}

/// Publishes this node's announcements to the cluster
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn service_announcements(&self) -> Vec<ServiceAnnouncement>;

    async fn add_service_announcement(&self, announcement: ServiceAnnouncement);

    async fn remove_service_announcement(&self, id: Uuid);

    /// Broadcast the current announcements immediately
    async fn force_announce(&self) -> CatalogResult<()>;
}

/// Maintains this node's view of cluster membership
#[async_trait]
pub trait NodeManager: Send + Sync {
    async fn refresh_nodes(&self);
}

/// Announcer keeping its announcements in process memory
#[derive(Debug, Default)]
pub struct MemoryAnnouncer {
    announcements: Mutex<Vec<ServiceAnnouncement>>,
    last_broadcast: Mutex<Vec<ServiceAnnouncement>>,
    broadcasts: AtomicU64,
    pending_failures: AtomicUsize,
}

impl MemoryAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out with the given announcements
    pub fn with_announcements(announcements: Vec<ServiceAnnouncement>) -> Self {
        Self {
            announcements: Mutex::new(announcements),
            ..Self::default()
        }
    }

    /// Number of successful broadcasts
    pub fn broadcast_count(&self) -> u64 {
        self.broadcasts.load(Ordering::Relaxed)
    }

    /// Announcements as of the last successful broadcast
    pub fn last_broadcast(&self) -> Vec<ServiceAnnouncement> {
        self.last_broadcast.lock().clone()
    }

    /// Make the next `count` broadcasts fail
    pub fn inject_failures(&self, count: usize) {
        self.pending_failures.store(count, Ordering::Relaxed);
    }
}

#[async_trait]
impl Announcer for MemoryAnnouncer {
    async fn service_announcements(&self) -> Vec<ServiceAnnouncement> {
        self.announcements.lock().clone()
    }

    async fn add_service_announcement(&self, announcement: ServiceAnnouncement) {
        self.announcements.lock().push(announcement);
    }

    async fn remove_service_announcement(&self, id: Uuid) {
        self.announcements.lock().retain(|a| a.id() != id);
    }

    async fn force_announce(&self) -> CatalogResult<()> {
        let failing = self
            .pending_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CatalogError::Announcement(
                "discovery service unavailable".to_string(),
            ));
        }

        let snapshot = self.announcements.lock().clone();
        *self.last_broadcast.lock() = snapshot;
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Node manager that only counts refresh requests
#[derive(Debug, Default)]
pub struct MemoryNodeManager {
    refreshes: AtomicU64,
}

impl MemoryNodeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NodeManager for MemoryNodeManager {
    async fn refresh_nodes(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_snapshot_and_failures() {
        let announcer = MemoryAnnouncer::new();
        let announcement = ServiceAnnouncement::new("trino", BTreeMap::new());
        let id = announcement.id();
        announcer.add_service_announcement(announcement).await;

        announcer.inject_failures(1);
        assert!(announcer.force_announce().await.is_err());
        assert_eq!(announcer.broadcast_count(), 0);

        announcer.force_announce().await.unwrap();
        assert_eq!(announcer.broadcast_count(), 1);
        assert_eq!(announcer.last_broadcast().len(), 1);

        announcer.remove_service_announcement(id).await;
        assert!(announcer.service_announcements().await.is_empty());
    }

    #[test]
    fn test_with_property_replaces_value() {
        let original = ServiceAnnouncement::new("trino", BTreeMap::new());
        let updated = original.with_property("connectorIds", "a,b");
        assert_eq!(updated.service_type(), "trino");
        assert_eq!(updated.properties().get("connectorIds").map(String::as_str), Some("a,b"));
        assert_ne!(updated.id(), original.id());
    }
}
