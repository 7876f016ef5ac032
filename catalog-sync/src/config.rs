// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dynamic catalog configuration
//!
//! Read once at node startup from the node's properties file. Keys this module
//! does not know about are ignored, the file is shared with other subsystems.

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::store::{path, StoreType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const ENABLED_KEY: &str = "catalog.dynamic.enabled";
pub const STORE_TYPE_KEY: &str = "catalog.store.type";
pub const ADDRESS_KEY: &str = "catalog.store.address";
pub const NAMESPACE_KEY: &str = "catalog.store.namespace";
pub const ROOT_PATH_KEY: &str = "catalog.store.path";
pub const EVENT_BUFFER_KEY: &str = "catalog.dynamic.event-buffer";
pub const DELETE_RETRIES_KEY: &str = "catalog.dynamic.delete-retries";
pub const SERVICE_TYPE_KEY: &str = "catalog.announcement.service-type";

/// Older ZooKeeper-specific spellings, read when the current key is absent
const LEGACY_KEYS: [(&str, &str); 3] = [
    (ADDRESS_KEY, "catalog.zk.address"),
    (NAMESPACE_KEY, "catalog.zk.namespace"),
    (ROOT_PATH_KEY, "catalog.zk.path"),
];

/// Configuration for dynamic catalog synchronization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Whether dynamic catalogs are administratively enabled
    pub enabled: bool,

    /// Coordination store backend
    pub store_type: StoreType,

    /// Coordination service address (directory for the sled backend)
    pub address: String,

    /// Namespace isolating this engine's data inside the coordination service
    pub namespace: String,

    /// Path under which every child node is one catalog definition
    pub root_path: String,

    /// Capacity of the queue between the watch dispatcher and the lifecycle manager
    pub event_buffer: usize,

    /// Extra attempts for guaranteed deletes
    pub delete_retries: u32,

    /// Service type of this node's own discovery announcement
    pub service_type: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            store_type: StoreType::default(),
            address: "127.0.0.1:2181".to_string(),
            namespace: "trino".to_string(),
            root_path: "/catalog/meta".to_string(),
            event_buffer: 1024,
            delete_retries: 5,
            service_type: "trino".to_string(),
        }
    }
}

impl SyncConfig {
    /// Build a configuration from parsed properties, starting from defaults
    pub fn from_properties(properties: &HashMap<String, String>) -> CatalogResult<Self> {
        let mut properties = properties.clone();
        for (key, legacy) in LEGACY_KEYS {
            if !properties.contains_key(key) {
                if let Some(value) = properties.get(legacy).cloned() {
                    properties.insert(key.to_string(), value);
                }
            }
        }

        let mut config = Self::default();

        if let Some(value) = properties.get(ENABLED_KEY) {
            config.enabled = parse_bool(ENABLED_KEY, value)?;
        }
        if let Some(value) = properties.get(STORE_TYPE_KEY) {
            config.store_type = value
                .parse()
                .map_err(|e: String| CatalogError::Configuration(e))?;
        }
        if let Some(value) = properties.get(ADDRESS_KEY) {
            config.address = value.trim().to_string();
        }
        if let Some(value) = properties.get(NAMESPACE_KEY) {
            config.namespace = value.trim().to_string();
        }
        if let Some(value) = properties.get(ROOT_PATH_KEY) {
            config.root_path = value.trim().to_string();
        }
        if let Some(value) = properties.get(EVENT_BUFFER_KEY) {
            config.event_buffer = parse_number(EVENT_BUFFER_KEY, value)?;
        }
        if let Some(value) = properties.get(DELETE_RETRIES_KEY) {
            config.delete_retries = parse_number(DELETE_RETRIES_KEY, value)?;
        }
        if let Some(value) = properties.get(SERVICE_TYPE_KEY) {
            config.service_type = value.trim().to_string();
        }

        Ok(config)
    }

    /// Load and validate a configuration from a properties file
    pub fn from_properties_file<P: AsRef<Path>>(file: P) -> CatalogResult<Self> {
        let file = file.as_ref();
        let text = std::fs::read_to_string(file).map_err(|e| {
            CatalogError::Configuration(format!("cannot read {}: {}", file.display(), e))
        })?;
        let config = Self::from_properties(&parse_properties(&text))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the engine cannot run with
    ///
    /// A disabled configuration is always valid, nothing will use it.
    pub fn validate(&self) -> CatalogResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.address.trim().is_empty() {
            return Err(CatalogError::Configuration(format!(
                "{} must be set when {}=true",
                ADDRESS_KEY, ENABLED_KEY
            )));
        }
        if self.namespace.trim_matches('/').is_empty() {
            return Err(CatalogError::Configuration(format!(
                "{} must not be empty",
                NAMESPACE_KEY
            )));
        }
        if self.root_path == "/" {
            return Err(CatalogError::Configuration(format!(
                "{} must not be the store root",
                ROOT_PATH_KEY
            )));
        }
        path::validate(&self.root_path).map_err(|e| {
            CatalogError::Configuration(format!("{}: {}", ROOT_PATH_KEY, e))
        })?;
        if self.event_buffer == 0 {
            return Err(CatalogError::Configuration(format!(
                "{} must be greater than zero",
                EVENT_BUFFER_KEY
            )));
        }
        if self.service_type.trim().is_empty() {
            return Err(CatalogError::Configuration(format!(
                "{} must not be empty",
                SERVICE_TYPE_KEY
            )));
        }
        Ok(())
    }

    /// Fail with a configuration error unless the feature is enabled
    pub fn ensure_enabled(&self) -> CatalogResult<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(CatalogError::Configuration(format!(
                "dynamic catalogs are disabled, set {}=true in node.properties",
                ENABLED_KEY
            )))
        }
    }

    /// Store path holding the definition of `catalog_name`
    pub fn catalog_path(&self, catalog_name: &str) -> String {
        path::join(&self.root_path, catalog_name)
    }
}

/// Parse Java-style properties text (`key=value` or `key: value`, `#`/`!` comments)
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split = line.find(|c: char| c == '=' || c == ':')?;
            let key = line[..split].trim();
            let value = line[split + 1..].trim();
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}

fn parse_bool(key: &str, value: &str) -> CatalogResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" | "" => Ok(false),
        other => Err(CatalogError::Configuration(format!(
            "{} expects true or false, got '{}'",
            key, other
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> CatalogResult<T> {
    value.trim().parse().map_err(|_| {
        CatalogError::Configuration(format!("{} expects a number, got '{}'", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.address, "127.0.0.1:2181");
        assert_eq!(config.namespace, "trino");
        assert_eq!(config.root_path, "/catalog/meta");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_properties_text() {
        let text = "\
# node settings
node.environment=production
catalog.dynamic.enabled = true
catalog.store.type=memory
catalog.store.namespace: analytics
catalog.store.path=/catalogs
! legacy comment
catalog.dynamic.event-buffer=16
";
        let config = SyncConfig::from_properties(&parse_properties(text)).unwrap();
        assert!(config.enabled);
        assert_eq!(config.store_type, StoreType::Memory);
        assert_eq!(config.namespace, "analytics");
        assert_eq!(config.root_path, "/catalogs");
        assert_eq!(config.event_buffer, 16);
        assert_eq!(config.catalog_path("sales"), "/catalogs/sales");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_keys() {
        let props = parse_properties(concat!(
            "catalog.zk.address=zk1:2181,zk2:2181\n",
            "catalog.zk.path=/legacy\n",
            "catalog.store.path=/current\n",
        ));
        let config = SyncConfig::from_properties(&props).unwrap();
        assert_eq!(config.address, "zk1:2181,zk2:2181");
        assert_eq!(config.root_path, "/current");
    }

    #[test]
    fn test_invalid_values() {
        let mut props = HashMap::new();
        props.insert(ENABLED_KEY.to_string(), "yes".to_string());
        assert!(matches!(
            SyncConfig::from_properties(&props),
            Err(CatalogError::Configuration(_))
        ));

        let config = SyncConfig {
            enabled: true,
            root_path: "catalog/meta/".to_string(),
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SyncConfig {
            enabled: true,
            address: " ".to_string(),
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_properties_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("node.properties");
        std::fs::write(
            &file,
            "catalog.dynamic.enabled=true\ncatalog.store.path=/catalog\n",
        )
        .unwrap();
        let config = SyncConfig::from_properties_file(&file).unwrap();
        assert!(config.enabled);
        assert_eq!(config.root_path, "/catalog");

        std::fs::write(&file, "catalog.dynamic.enabled=true\ncatalog.dynamic.event-buffer=0\n")
            .unwrap();
        assert!(SyncConfig::from_properties_file(&file).is_err());
        assert!(SyncConfig::from_properties_file(temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_ensure_enabled() {
        assert!(SyncConfig::default().ensure_enabled().is_err());
        let config = SyncConfig {
            enabled: true,
            ..SyncConfig::default()
        };
        assert!(config.ensure_enabled().is_ok());
    }
}
