// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog management operations
//!
//! Reads and writes definitions in the coordination store only. The active
//! catalogs of any node, including this one, change later when the write
//! comes back through the watch.

use crate::catalog::{
    codec, validate_catalog_name, CatalogDefinition, CatalogDefinitionRequest, CatalogError,
    CatalogResult,
};
use crate::store::path::SEPARATOR;
use crate::config::SyncConfig;
use crate::store::{delete_guaranteed, CoordinationStore};
use std::sync::Arc;

pub struct CatalogResource {
    config: Arc<SyncConfig>,
    store: Arc<dyn CoordinationStore>,
}

impl CatalogResource {
    pub fn new(config: Arc<SyncConfig>, store: Arc<dyn CoordinationStore>) -> Self {
        Self { config, store }
    }

    /// All stored definitions that can be read and decoded
    ///
    /// Entries that fail to fetch or decode are left out, and a listing that
    /// fails as a whole yields an empty result.
    pub async fn list(&self) -> CatalogResult<Vec<CatalogDefinition>> {
        self.config.ensure_enabled()?;

        let root = &self.config.root_path;
        let names = match self.store.children(root).await {
            Ok(names) => names,
            Err(e) => {
                log::warn!("Cannot list catalogs under '{}': {}", root, e);
                return Ok(Vec::new());
            }
        };

        let mut definitions = Vec::with_capacity(names.len());
        for name in names {
            let node = self.config.catalog_path(&name);
            match self.store.get(&node).await {
                Ok(data) => match codec::decode(&data) {
                    Ok(definition) => definitions.push(definition),
                    Err(e) => log::warn!("Skipping catalog '{}': {}", name, e),
                },
                Err(e) => log::warn!("Skipping catalog '{}': {}", name, e),
            }
        }
        Ok(definitions)
    }

    pub async fn detail(&self, catalog_name: &str) -> CatalogResult<CatalogDefinition> {
        self.config.ensure_enabled()?;
        let node = self.catalog_node(catalog_name)?;

        let data = self.store.get(&node).await?;
        codec::decode(&data)
    }

    /// Validate and create or replace a definition
    pub async fn save(
        &self,
        request: CatalogDefinitionRequest,
    ) -> CatalogResult<CatalogDefinition> {
        self.config.ensure_enabled()?;
        let definition = CatalogDefinition::try_from(request)?;
        validate_catalog_name(definition.catalog_name())?;

        let node = self.config.catalog_path(definition.catalog_name());
        self.store
            .create_or_set(&node, &codec::encode(&definition)?)
            .await?;
        log::info!(
            "Stored catalog {} using connector {}",
            definition.catalog_name(),
            definition.connector_name()
        );
        Ok(definition)
    }

    /// Delete a definition and anything below it, retrying until gone
    pub async fn delete(&self, catalog_name: &str) -> CatalogResult<()> {
        self.config.ensure_enabled()?;
        let node = self.catalog_node(catalog_name)?;

        delete_guaranteed(self.store.as_ref(), &node, self.config.delete_retries).await?;
        log::info!("Deleted catalog {}", catalog_name);
        Ok(())
    }

    /// Store path of an existing catalog, which must be one path segment
    fn catalog_node(&self, catalog_name: &str) -> CatalogResult<String> {
        if catalog_name.trim().is_empty() || catalog_name.contains(SEPARATOR) {
            return Err(CatalogError::Validation(format!(
                "'{}' is not a catalog name",
                catalog_name
            )));
        }
        Ok(self.config.catalog_path(catalog_name))
    }
}
