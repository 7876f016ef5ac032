// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory connector holding its configuration only

use crate::connector::error::ConnectorResult;
use crate::connector::traits::{Connector, ConnectorFactory};
use std::collections::BTreeMap;

pub struct MemoryConnectorFactory;

impl ConnectorFactory for MemoryConnectorFactory {
    fn name(&self) -> &str {
        "memory"
    }

    fn create(
        &self,
        catalog_name: &str,
        properties: &BTreeMap<String, String>,
    ) -> ConnectorResult<Box<dyn Connector>> {
        Ok(Box::new(MemoryConnector {
            catalog_name: catalog_name.to_string(),
            properties: properties.clone(),
        }))
    }
}

pub struct MemoryConnector {
    catalog_name: String,
    properties: BTreeMap<String, String>,
}

impl Connector for MemoryConnector {
    fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    fn connector_name(&self) -> &str {
        "memory"
    }

    fn shutdown(&self) -> ConnectorResult<()> {
        log::debug!(
            "Releasing memory catalog '{}' with {} properties",
            self.catalog_name,
            self.properties.len()
        );
        Ok(())
    }
}
