// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the connector layer

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("Unknown connector: {0}")]
    UnknownConnector(String),

    #[error("Catalog already exists: {0}")]
    CatalogAlreadyExists(String),

    #[error("Invalid connector properties: {0}")]
    InvalidProperties(String),

    #[error("Connector shutdown failed: {0}")]
    ShutdownFailed(String),
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
