// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connector that accepts any configuration and serves nothing

use crate::connector::error::ConnectorResult;
use crate::connector::traits::{Connector, ConnectorFactory};
use std::collections::BTreeMap;

pub struct BlackholeConnectorFactory;

impl ConnectorFactory for BlackholeConnectorFactory {
    fn name(&self) -> &str {
        "blackhole"
    }

    fn create(
        &self,
        catalog_name: &str,
        _properties: &BTreeMap<String, String>,
    ) -> ConnectorResult<Box<dyn Connector>> {
        Ok(Box::new(BlackholeConnector {
            catalog_name: catalog_name.to_string(),
        }))
    }
}

struct BlackholeConnector {
    catalog_name: String,
}

impl Connector for BlackholeConnector {
    fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    fn connector_name(&self) -> &str {
        "blackhole"
    }
}
