// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for dynamic catalog synchronization

use crate::connector::ConnectorError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    /// Feature disabled, missing connection parameters or a missing self-announcement
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A stored definition could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// A submitted definition is missing required fields
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Coordination store error: {0}")]
    Store(#[from] StoreError),

    #[error("Announcement error: {0}")]
    Announcement(String),

    /// The watch on the catalog subtree ended and will deliver no more events
    #[error("Catalog watch terminated: {0}")]
    WatchTerminated(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
