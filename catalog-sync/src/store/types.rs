// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Coordination store types and error handling
//!
//! This module defines the backend selector, the raw notifications delivered by
//! subtree subscriptions, and the error type shared by every store backend.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Coordination store backend configuration
///
/// Specifies which implementation backs the coordination store client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    /// Sled - embedded, durable store with prefix watches
    /// Best for: single-host clusters, development, integration testing
    Sled,

    /// Memory - in-process ensemble shared by client handles
    /// Best for: unit testing, ephemeral development nodes
    Memory,
}

impl Default for StoreType {
    fn default() -> Self {
        StoreType::Sled
    }
}

impl std::str::FromStr for StoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sled" => Ok(StoreType::Sled),
            "memory" => Ok(StoreType::Memory),
            _ => Err(format!(
                "Unknown store type: {}. Valid options: sled, memory",
                s
            )),
        }
    }
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreType::Sled => "sled",
            StoreType::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// Raw structural notification produced by a subtree subscription
///
/// Paths are always client-visible paths, with any namespace prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreNotification {
    /// A node appeared under the watched root (or was part of the initial snapshot)
    NodeAdded { path: String, data: Vec<u8> },

    /// The data of an existing node changed
    NodeUpdated {
        path: String,
        old_data: Vec<u8>,
        data: Vec<u8>,
    },

    /// A node disappeared; `data` is its last known value
    NodeRemoved { path: String, data: Vec<u8> },

    /// The initial snapshot has been fully delivered
    Initialized,

    /// The subscription can no longer deliver notifications
    ConnectionLost { reason: String },
}

/// Error type for coordination store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No node at path: {0}")]
    NoNode(String),

    #[error("Connection lost: {0}")]
    ConnectionLoss(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::ConnectionLoss(_))
    }
}

/// Result type for coordination store operations
pub type StoreResult<T> = Result<T, StoreError>;
