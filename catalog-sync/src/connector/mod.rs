// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connector instantiation layer
//!
//! The engine asks a [`ConnectorManager`] to create or drop the connector of a
//! catalog. [`ConnectorRegistry`] is the in-process implementation, built from
//! pluggable [`ConnectorFactory`] implementations.

pub mod error;
pub mod providers;
pub mod registry;
pub mod traits;

pub use error::{ConnectorError, ConnectorResult};
pub use registry::ConnectorRegistry;
pub use traits::{Connector, ConnectorFactory, ConnectorId, ConnectorManager};
