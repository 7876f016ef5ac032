// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connector-instantiation traits
//!
//! The synchronization engine only ever talks to connectors through
//! [`ConnectorManager`]. [`ConnectorFactory`] and [`Connector`] are the plug-in
//! points of the in-process [`super::ConnectorRegistry`].

use super::error::ConnectorResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier of a connector instance, derived from its catalog name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectorId(String);

impl ConnectorId {
    pub fn new(catalog_name: impl Into<String>) -> Self {
        Self(catalog_name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates and drops connectors on behalf of catalogs
///
/// Both calls may block on network I/O; callers must not hold locks across them.
#[async_trait]
pub trait ConnectorManager: Send + Sync {
    /// Instantiate `connector_name` as catalog `catalog_name`
    ///
    /// # Returns
    /// * `Ok(ConnectorId)` identifying the new connector
    /// * `Err(ConnectorError)` if the connector is unknown, the catalog name is
    ///   taken or the properties are rejected
    async fn create_catalog(
        &self,
        catalog_name: &str,
        connector_name: &str,
        properties: &BTreeMap<String, String>,
    ) -> ConnectorResult<ConnectorId>;

    /// Shut down and forget the connector of `catalog_name`
    ///
    /// Dropping a catalog that has no connector is a no-op.
    async fn drop_catalog(&self, catalog_name: &str) -> ConnectorResult<()>;
}

/// A live connector serving one catalog
pub trait Connector: Send + Sync {
    fn catalog_name(&self) -> &str;

    fn connector_name(&self) -> &str;

    /// Release resources held by the connector
    fn shutdown(&self) -> ConnectorResult<()> {
        Ok(())
    }
}

/// Builds connectors of one implementation
pub trait ConnectorFactory: Send + Sync {
    /// Connector name this factory is registered under
    fn name(&self) -> &str;

    /// Validate `properties` and build a connector for `catalog_name`
    fn create(
        &self,
        catalog_name: &str,
        properties: &BTreeMap<String, String>,
    ) -> ConnectorResult<Box<dyn Connector>>;
}
