// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Coordination store client trait
//!
//! This module defines the interface every coordination store backend must
//! implement: linearizable reads and writes of byte blobs keyed by hierarchical
//! path, plus subtree subscriptions that deliver structural notifications.

use super::types::{StoreNotification, StoreResult, StoreType};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Client handle for a hierarchical, watch-capable key-value store
///
/// Implementations own connection and session handling. Callers only see
/// paths relative to the namespace the handle was opened with.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Read the data stored at `path`
    ///
    /// # Returns
    /// * `Err(StoreError::NoNode)` if nothing exists at `path`
    async fn get(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Check whether a node exists at `path`
    async fn exists(&self, path: &str) -> StoreResult<bool>;

    /// List the names of the direct children of `path`, sorted
    ///
    /// # Returns
    /// * `Err(StoreError::NoNode)` if `path` itself does not exist
    async fn children(&self, path: &str) -> StoreResult<Vec<String>>;

    /// Create the node at `path` or replace its data, creating missing parents
    async fn create_or_set(&self, path: &str, data: &[u8]) -> StoreResult<()>;

    /// Delete the node at `path` together with all of its descendants
    ///
    /// # Returns
    /// * `Err(StoreError::NoNode)` if nothing exists at `path`
    async fn delete_recursive(&self, path: &str) -> StoreResult<()>;

    /// Subscribe to structural changes of the subtree rooted at `root`
    ///
    /// The subscription first replays the existing subtree as `NodeAdded`
    /// notifications (parents before children), then sends `Initialized`,
    /// then live changes. Dropping the subscription unsubscribes.
    async fn subscribe(&self, root: &str) -> StoreResult<Subscription>;

    /// Backend type of this handle
    fn store_type(&self) -> StoreType;
}

/// Live subtree subscription
pub struct Subscription {
    root: String,
    receiver: mpsc::UnboundedReceiver<StoreNotification>,
}

impl Subscription {
    pub fn new(
        root: impl Into<String>,
        receiver: mpsc::UnboundedReceiver<StoreNotification>,
    ) -> Self {
        Self {
            root: root.into(),
            receiver,
        }
    }

    /// Path of the watched root
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Wait for the next notification
    ///
    /// Returns `None` once the store has dropped its side of the subscription.
    pub async fn next(&mut self) -> Option<StoreNotification> {
        self.receiver.recv().await
    }

    /// Take a notification if one is already queued
    pub fn try_next(&mut self) -> Option<StoreNotification> {
        self.receiver.try_recv().ok()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("root", &self.root)
            .finish()
    }
}
