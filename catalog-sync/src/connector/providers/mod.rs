// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Built-in connector factories
//!
//! Adding a connector requires implementing [`ConnectorFactory`] and adding one
//! line to [`register_all_connectors`].
//!
//! [`ConnectorFactory`]: super::traits::ConnectorFactory

use super::registry::ConnectorRegistry;
use std::sync::Arc;

pub mod blackhole;
pub mod jdbc;
pub mod memory;

/// Register every built-in connector factory
pub fn register_all_connectors(registry: &mut ConnectorRegistry) {
    registry.register(Arc::new(memory::MemoryConnectorFactory));
    registry.register(Arc::new(blackhole::BlackholeConnectorFactory));
    registry.register(Arc::new(jdbc::JdbcConnectorFactory::new("postgresql")));
    registry.register(Arc::new(jdbc::JdbcConnectorFactory::new("mysql")));

    log::info!("Connector factory registration complete");
}
