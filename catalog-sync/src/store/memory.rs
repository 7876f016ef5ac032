// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory coordination store for testing and ephemeral nodes
//!
//! A [`MemoryEnsemble`] plays the role of the coordination service: it owns the
//! node tree and the registered watchers. Every cluster node gets its own
//! [`MemoryCoordinationStore`] client handle from the same ensemble, so a
//! single process can host a whole simulated cluster.

use super::path;
use super::traits::{CoordinationStore, Subscription};
use super::types::{StoreError, StoreNotification, StoreResult, StoreType};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shared in-memory coordination service
#[derive(Clone, Default)]
pub struct MemoryEnsemble {
    state: Arc<Mutex<EnsembleState>>,
}

#[derive(Default)]
struct EnsembleState {
    /// Full (namespaced) path to node data
    nodes: BTreeMap<String, Vec<u8>>,
    watchers: Vec<Watcher>,
    /// Number of upcoming operations that fail with a connection loss
    pending_failures: usize,
    /// Subscriptions established over the ensemble lifetime
    subscriptions_opened: usize,
}

struct Watcher {
    /// Full path of the watched root
    root: String,
    namespace: String,
    sender: mpsc::UnboundedSender<StoreNotification>,
}

impl EnsembleState {
    fn take_failure(&mut self, op: &str) -> StoreResult<()> {
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(StoreError::ConnectionLoss(format!(
                "injected failure during {}",
                op
            )));
        }
        Ok(())
    }

    /// Deliver a notification for `full_path` to every watcher covering it
    fn notify<F>(&mut self, full_path: &str, build: F)
    where
        F: Fn(String) -> StoreNotification,
    {
        self.watchers.retain(|watcher| {
            if !path::is_within(&watcher.root, full_path) {
                return !watcher.sender.is_closed();
            }
            let visible = path::strip_namespace(&watcher.namespace, full_path).to_string();
            watcher.sender.send(build(visible)).is_ok()
        });
    }

    fn put(&mut self, full: &str, data: &[u8]) {
        for ancestor in path::ancestors(full) {
            if !self.nodes.contains_key(&ancestor) {
                self.nodes.insert(ancestor.clone(), Vec::new());
                self.notify(&ancestor, |p| StoreNotification::NodeAdded {
                    path: p,
                    data: Vec::new(),
                });
            }
        }

        match self.nodes.insert(full.to_string(), data.to_vec()) {
            Some(old_data) => self.notify(full, |p| StoreNotification::NodeUpdated {
                path: p,
                old_data: old_data.clone(),
                data: data.to_vec(),
            }),
            None => self.notify(full, |p| StoreNotification::NodeAdded {
                path: p,
                data: data.to_vec(),
            }),
        }
    }

    fn delete(&mut self, full: &str) -> StoreResult<()> {
        if !self.nodes.contains_key(full) {
            return Err(StoreError::NoNode(full.to_string()));
        }

        let prefix = path::descendant_prefix(full);
        let mut doomed: Vec<String> = self
            .nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .collect();
        doomed.push(full.to_string());

        // Sorted order puts parents before children, so reverse removes leaves first
        doomed.sort();
        for key in doomed.into_iter().rev() {
            if let Some(data) = self.nodes.remove(&key) {
                self.notify(&key, |p| StoreNotification::NodeRemoved {
                    path: p,
                    data: data.clone(),
                });
            }
        }
        Ok(())
    }
}

impl MemoryEnsemble {
    /// Create an empty ensemble
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a client handle scoped to `namespace`
    pub fn connect(&self, namespace: &str) -> MemoryCoordinationStore {
        MemoryCoordinationStore {
            ensemble: self.clone(),
            namespace: namespace.trim_matches('/').to_string(),
        }
    }

    /// Make the next `count` client operations fail with a connection loss
    pub fn inject_failures(&self, count: usize) {
        self.state.lock().pending_failures = count;
    }

    /// Terminate every live subscription with a connection-lost notification
    pub fn expire_sessions(&self) {
        let mut state = self.state.lock();
        for watcher in state.watchers.drain(..) {
            let _ = watcher.sender.send(StoreNotification::ConnectionLost {
                reason: "session expired".to_string(),
            });
        }
    }

    /// Number of subscriptions ever established
    pub fn subscriptions_opened(&self) -> usize {
        self.state.lock().subscriptions_opened
    }

    /// Number of subscriptions still attached
    pub fn active_watchers(&self) -> usize {
        let mut state = self.state.lock();
        state.watchers.retain(|w| !w.sender.is_closed());
        state.watchers.len()
    }
}

/// Client handle onto a [`MemoryEnsemble`]
#[derive(Clone)]
pub struct MemoryCoordinationStore {
    ensemble: MemoryEnsemble,
    namespace: String,
}

impl MemoryCoordinationStore {
    /// Create a handle backed by its own private ensemble
    pub fn new(namespace: &str) -> Self {
        MemoryEnsemble::new().connect(namespace)
    }

    /// The ensemble this handle talks to
    pub fn ensemble(&self) -> &MemoryEnsemble {
        &self.ensemble
    }

    fn full_path(&self, client_path: &str) -> StoreResult<String> {
        path::validate(client_path)?;
        Ok(path::namespaced(&self.namespace, client_path))
    }
}

#[async_trait]
impl CoordinationStore for MemoryCoordinationStore {
    async fn get(&self, client_path: &str) -> StoreResult<Vec<u8>> {
        let full = self.full_path(client_path)?;
        let mut state = self.ensemble.state.lock();
        state.take_failure("get")?;
        state
            .nodes
            .get(&full)
            .cloned()
            .ok_or_else(|| StoreError::NoNode(client_path.to_string()))
    }

    async fn exists(&self, client_path: &str) -> StoreResult<bool> {
        let full = self.full_path(client_path)?;
        let mut state = self.ensemble.state.lock();
        state.take_failure("exists")?;
        Ok(state.nodes.contains_key(&full))
    }

    async fn children(&self, client_path: &str) -> StoreResult<Vec<String>> {
        let full = self.full_path(client_path)?;
        let mut state = self.ensemble.state.lock();
        state.take_failure("children")?;
        if full != "/" && !state.nodes.contains_key(&full) {
            return Err(StoreError::NoNode(client_path.to_string()));
        }
        Ok(state
            .nodes
            .keys()
            .filter_map(|key| path::direct_child_name(&full, key))
            .map(str::to_string)
            .collect())
    }

    async fn create_or_set(&self, client_path: &str, data: &[u8]) -> StoreResult<()> {
        let full = self.full_path(client_path)?;
        if full == "/" {
            return Err(StoreError::InvalidPath("cannot write the root node".to_string()));
        }
        let mut state = self.ensemble.state.lock();
        state.take_failure("create_or_set")?;
        state.put(&full, data);
        Ok(())
    }

    async fn delete_recursive(&self, client_path: &str) -> StoreResult<()> {
        let full = self.full_path(client_path)?;
        let mut state = self.ensemble.state.lock();
        state.take_failure("delete")?;
        state
            .delete(&full)
            .map_err(|_| StoreError::NoNode(client_path.to_string()))
    }

    async fn subscribe(&self, root: &str) -> StoreResult<Subscription> {
        let full_root = self.full_path(root)?;
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut state = self.ensemble.state.lock();
        state.take_failure("subscribe")?;

        for (key, data) in state
            .nodes
            .iter()
            .filter(|(key, _)| path::is_within(&full_root, key))
        {
            let _ = sender.send(StoreNotification::NodeAdded {
                path: path::strip_namespace(&self.namespace, key).to_string(),
                data: data.clone(),
            });
        }
        let _ = sender.send(StoreNotification::Initialized);

        state.watchers.push(Watcher {
            root: full_root,
            namespace: self.namespace.clone(),
            sender,
        });
        state.subscriptions_opened += 1;

        Ok(Subscription::new(root, receiver))
    }

    fn store_type(&self) -> StoreType {
        StoreType::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(subscription: &mut Subscription) -> Vec<StoreNotification> {
        let mut out = Vec::new();
        while let Some(n) = subscription.try_next() {
            out.push(n);
        }
        out
    }

    #[tokio::test]
    async fn test_create_or_set_creates_parents() {
        let store = MemoryCoordinationStore::new("trino");
        store
            .create_or_set("/catalog/meta/sales", b"{}")
            .await
            .unwrap();

        assert!(store.exists("/catalog").await.unwrap());
        assert_eq!(store.get("/catalog/meta").await.unwrap(), Vec::<u8>::new());
        assert_eq!(
            store.children("/catalog/meta").await.unwrap(),
            vec!["sales".to_string()]
        );
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let ensemble = MemoryEnsemble::new();
        let a = ensemble.connect("a");
        let b = ensemble.connect("b");

        a.create_or_set("/catalog/meta/x", b"1").await.unwrap();
        assert!(!b.exists("/catalog/meta/x").await.unwrap());
        assert!(matches!(
            b.children("/catalog/meta").await,
            Err(StoreError::NoNode(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribe_replays_snapshot_then_live_changes() {
        let store = MemoryCoordinationStore::new("trino");
        store.create_or_set("/catalog/meta/a", b"1").await.unwrap();

        let mut subscription = store.subscribe("/catalog/meta").await.unwrap();
        let snapshot = drain(&mut subscription);
        assert_eq!(
            snapshot,
            vec![
                StoreNotification::NodeAdded {
                    path: "/catalog/meta".to_string(),
                    data: Vec::new()
                },
                StoreNotification::NodeAdded {
                    path: "/catalog/meta/a".to_string(),
                    data: b"1".to_vec()
                },
                StoreNotification::Initialized,
            ]
        );

        store.create_or_set("/catalog/meta/a", b"2").await.unwrap();
        store.delete_recursive("/catalog/meta/a").await.unwrap();
        store.create_or_set("/catalog/other", b"x").await.unwrap();

        assert_eq!(
            drain(&mut subscription),
            vec![
                StoreNotification::NodeUpdated {
                    path: "/catalog/meta/a".to_string(),
                    old_data: b"1".to_vec(),
                    data: b"2".to_vec()
                },
                StoreNotification::NodeRemoved {
                    path: "/catalog/meta/a".to_string(),
                    data: b"2".to_vec()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_recursive_removes_leaves_first() {
        let store = MemoryCoordinationStore::new("");
        store.create_or_set("/root/a/b", b"leaf").await.unwrap();
        let mut subscription = store.subscribe("/root").await.unwrap();
        drain(&mut subscription);

        store.delete_recursive("/root/a").await.unwrap();
        let removed: Vec<String> = drain(&mut subscription)
            .into_iter()
            .filter_map(|n| match n {
                StoreNotification::NodeRemoved { path, .. } => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(removed, vec!["/root/a/b".to_string(), "/root/a".to_string()]);
        assert!(matches!(
            store.delete_recursive("/root/a").await,
            Err(StoreError::NoNode(_))
        ));
    }

    #[tokio::test]
    async fn test_injected_failures_and_session_expiry() {
        let store = MemoryCoordinationStore::new("trino");
        store.ensemble().inject_failures(1);
        assert!(matches!(
            store.create_or_set("/x", b"1").await,
            Err(StoreError::ConnectionLoss(_))
        ));
        store.create_or_set("/x", b"1").await.unwrap();

        let mut subscription = store.subscribe("/x").await.unwrap();
        drain(&mut subscription);
        store.ensemble().expire_sessions();
        assert!(matches!(
            subscription.next().await,
            Some(StoreNotification::ConnectionLost { .. })
        ));
        assert_eq!(subscription.next().await, None);
        assert_eq!(store.ensemble().subscriptions_opened(), 1);
    }
}
