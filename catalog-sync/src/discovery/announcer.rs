// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Capability announcer
//!
//! Keeps the `connectorIds` property of this node's own announcement in step
//! with the connectors it serves. Each change is a read-merge-write-broadcast
//! of the announcement, serialized against every other change made through
//! the same announcer.

use super::announcement::{Announcer, NodeManager, ServiceAnnouncement};
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::connector::ConnectorId;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Announcement property listing the served connector ids, comma separated
pub const CONNECTOR_IDS_PROPERTY: &str = "connectorIds";

pub struct CapabilityAnnouncer {
    service_type: String,
    announcer: Arc<dyn Announcer>,
    node_manager: Arc<dyn NodeManager>,
    critical_section: Mutex<()>,
}

impl CapabilityAnnouncer {
    pub fn new(
        service_type: impl Into<String>,
        announcer: Arc<dyn Announcer>,
        node_manager: Arc<dyn NodeManager>,
    ) -> Self {
        Self {
            service_type: service_type.into(),
            announcer,
            node_manager,
            critical_section: Mutex::new(()),
        }
    }

    /// Add `connector_id` to the advertised set and re-broadcast
    ///
    /// Announcing an id that is already present leaves the set unchanged but
    /// still broadcasts.
    pub async fn announce(&self, connector_id: &ConnectorId) -> CatalogResult<()> {
        let _guard = self.critical_section.lock().await;
        let current = self.own_announcement().await?;

        let mut ids = parse_connector_ids(current.properties().get(CONNECTOR_IDS_PROPERTY));
        if !ids.iter().any(|id| id == connector_id.as_str()) {
            ids.push(connector_id.to_string());
        }
        self.publish(current, &ids).await?;

        log::info!("Announced connector '{}'", connector_id);
        Ok(())
    }

    /// Remove `connector_id` from the advertised set and re-broadcast
    pub async fn withdraw(&self, connector_id: &ConnectorId) -> CatalogResult<()> {
        let _guard = self.critical_section.lock().await;
        let current = self.own_announcement().await?;

        let mut ids = parse_connector_ids(current.properties().get(CONNECTOR_IDS_PROPERTY));
        ids.retain(|id| id != connector_id.as_str());
        self.publish(current, &ids).await?;

        log::info!("Withdrew connector '{}'", connector_id);
        Ok(())
    }

    /// Connector ids currently advertised by this node
    pub async fn advertised(&self) -> CatalogResult<Vec<String>> {
        let current = self.own_announcement().await?;
        Ok(parse_connector_ids(
            current.properties().get(CONNECTOR_IDS_PROPERTY),
        ))
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    async fn own_announcement(&self) -> CatalogResult<ServiceAnnouncement> {
        self.announcer
            .service_announcements()
            .await
            .into_iter()
            .find(|a| a.service_type() == self.service_type)
            .ok_or_else(|| {
                CatalogError::Configuration(format!(
                    "no '{}' service announcement registered for this node",
                    self.service_type
                ))
            })
    }

    async fn publish(&self, current: ServiceAnnouncement, ids: &[String]) -> CatalogResult<()> {
        let updated = current.with_property(CONNECTOR_IDS_PROPERTY, ids.join(","));
        self.announcer.remove_service_announcement(current.id()).await;
        self.announcer.add_service_announcement(updated).await;
        self.announcer.force_announce().await?;
        self.node_manager.refresh_nodes().await;
        Ok(())
    }
}

/// Split a `connectorIds` value into unique, non-empty ids, keeping first-seen order
pub fn parse_connector_ids(value: Option<&String>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in value.map(String::as_str).unwrap_or("").split(',') {
        let id = id.trim();
        if !id.is_empty() && !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::announcement::{MemoryAnnouncer, MemoryNodeManager};
    use std::collections::BTreeMap;

    fn announcer_with(
        ids: Option<&str>,
    ) -> (Arc<MemoryAnnouncer>, Arc<MemoryNodeManager>, CapabilityAnnouncer) {
        let mut properties = BTreeMap::new();
        if let Some(ids) = ids {
            properties.insert(CONNECTOR_IDS_PROPERTY.to_string(), ids.to_string());
        }
        let announcer = Arc::new(MemoryAnnouncer::with_announcements(vec![
            ServiceAnnouncement::new("jmx", BTreeMap::new()),
            ServiceAnnouncement::new("trino", properties),
        ]));
        let nodes = Arc::new(MemoryNodeManager::new());
        let capability = CapabilityAnnouncer::new("trino", announcer.clone(), nodes.clone());
        (announcer, nodes, capability)
    }

    #[test]
    fn test_parse_connector_ids() {
        let value = " system , tpch,,system ,".to_string();
        assert_eq!(parse_connector_ids(Some(&value)), vec!["system", "tpch"]);
        assert!(parse_connector_ids(None).is_empty());
    }

    #[tokio::test]
    async fn test_announce_merges_and_is_idempotent() {
        let (announcer, nodes, capability) = announcer_with(Some("system,tpch"));

        capability.announce(&ConnectorId::new("sales")).await.unwrap();
        capability.announce(&ConnectorId::new("sales")).await.unwrap();

        assert_eq!(capability.advertised().await.unwrap(), vec!["system", "tpch", "sales"]);
        assert_eq!(announcer.broadcast_count(), 2);
        assert_eq!(nodes.refresh_count(), 2);
        assert_eq!(announcer.service_announcements().await.len(), 2);
    }

    #[tokio::test]
    async fn test_withdraw_removes_id() {
        let (_announcer, _nodes, capability) = announcer_with(Some("system,sales"));
        capability.withdraw(&ConnectorId::new("sales")).await.unwrap();
        assert_eq!(capability.advertised().await.unwrap(), vec!["system"]);
    }

    #[tokio::test]
    async fn test_missing_own_announcement_is_configuration_error() {
        let capability = CapabilityAnnouncer::new(
            "trino",
            Arc::new(MemoryAnnouncer::new()),
            Arc::new(MemoryNodeManager::new()),
        );
        assert!(matches!(
            capability.announce(&ConnectorId::new("sales")).await,
            Err(CatalogError::Configuration(_))
        ));
    }
}
