// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! JDBC-style connectors
//!
//! No connection is opened here; the factory validates the connection
//! properties the way the real connector would before the catalog goes live.

use crate::connector::error::{ConnectorError, ConnectorResult};
use crate::connector::traits::{Connector, ConnectorFactory};
use std::collections::BTreeMap;

pub const CONNECTION_URL: &str = "connection-url";
pub const CONNECTION_USER: &str = "connection-user";

/// Factory for one JDBC-backed connector implementation
pub struct JdbcConnectorFactory {
    name: String,
}

impl JdbcConnectorFactory {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl ConnectorFactory for JdbcConnectorFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(
        &self,
        catalog_name: &str,
        properties: &BTreeMap<String, String>,
    ) -> ConnectorResult<Box<dyn Connector>> {
        let url = properties
            .get(CONNECTION_URL)
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                ConnectorError::InvalidProperties(format!(
                    "{} connector for catalog '{}' requires '{}'",
                    self.name, catalog_name, CONNECTION_URL
                ))
            })?;
        if !url.starts_with("jdbc:") {
            return Err(ConnectorError::InvalidProperties(format!(
                "'{}' must be a jdbc: URL, got '{}'",
                CONNECTION_URL, url
            )));
        }

        log::debug!("Configured {} connector for catalog '{}'", self.name, catalog_name);
        Ok(Box::new(JdbcConnector {
            catalog_name: catalog_name.to_string(),
            connector_name: self.name.clone(),
            url: url.to_string(),
            user: properties.get(CONNECTION_USER).cloned(),
        }))
    }
}

pub struct JdbcConnector {
    catalog_name: String,
    connector_name: String,
    url: String,
    user: Option<String>,
}

impl Connector for JdbcConnector {
    fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    fn connector_name(&self) -> &str {
        &self.connector_name
    }

    fn shutdown(&self) -> ConnectorResult<()> {
        log::debug!(
            "Closing {} connector for catalog '{}' ({} as {})",
            self.connector_name,
            self.catalog_name,
            self.url,
            self.user.as_deref().unwrap_or("<default user>")
        );
        Ok(())
    }
}
