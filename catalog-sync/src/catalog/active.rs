// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node-local set of active catalogs

use super::definition::CatalogDefinition;
use crate::connector::ConnectorId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One catalog currently served by this node
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCatalog {
    pub connector_id: ConnectorId,
    pub definition: CatalogDefinition,
    pub activated_at: DateTime<Utc>,
}

/// Mapping from catalog name to its active connector
///
/// Every method takes the lock for one read-modify-write of a single entry and
/// releases it before returning, so no caller can hold it across a connector
/// call.
#[derive(Debug, Default)]
pub struct ActiveCatalogSet {
    entries: Mutex<HashMap<String, ActiveCatalog>>,
}

impl ActiveCatalogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for the definition's catalog name
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(
        &self,
        definition: CatalogDefinition,
        connector_id: ConnectorId,
    ) -> Option<ActiveCatalog> {
        let name = definition.catalog_name().to_string();
        self.entries.lock().insert(
            name,
            ActiveCatalog {
                connector_id,
                definition,
                activated_at: Utc::now(),
            },
        )
    }

    pub fn remove(&self, catalog_name: &str) -> Option<ActiveCatalog> {
        self.entries.lock().remove(catalog_name)
    }

    pub fn get(&self, catalog_name: &str) -> Option<ActiveCatalog> {
        self.entries.lock().get(catalog_name).cloned()
    }

    pub fn contains(&self, catalog_name: &str) -> bool {
        self.entries.lock().contains_key(catalog_name)
    }

    /// Sorted names of all active catalogs
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn definition(name: &str, connector: &str) -> CatalogDefinition {
        let mut properties = BTreeMap::new();
        properties.insert("k".to_string(), "v".to_string());
        CatalogDefinition::new(name, connector, properties).unwrap()
    }

    #[test]
    fn test_one_entry_per_name() {
        let set = ActiveCatalogSet::new();
        assert!(set
            .insert(definition("sales", "postgresql"), ConnectorId::new("sales"))
            .is_none());

        let replaced = set
            .insert(definition("sales", "mysql"), ConnectorId::new("sales"))
            .unwrap();
        assert_eq!(replaced.definition.connector_name(), "postgresql");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("sales").unwrap().definition.connector_name(), "mysql");
    }

    #[test]
    fn test_remove_and_names() {
        let set = ActiveCatalogSet::new();
        set.insert(definition("b", "memory"), ConnectorId::new("b"));
        set.insert(definition("a", "memory"), ConnectorId::new("a"));
        assert_eq!(set.names(), vec!["a".to_string(), "b".to_string()]);

        assert!(set.remove("a").is_some());
        assert!(set.remove("a").is_none());
        assert!(!set.contains("a"));
        assert!(!set.is_empty());
    }
}
