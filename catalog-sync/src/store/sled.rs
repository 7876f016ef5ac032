// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled coordination store implementation
//!
//! Each namespace maps onto one sled tree whose keys are node paths. Subtree
//! subscriptions ride on `watch_prefix`: a watcher thread keeps the last known
//! contents of the subtree so raw inserts and removals can be classified into
//! added, updated and removed notifications.
//!
//! Raw events that no longer match the tree are skipped. That covers writes
//! queued between registering the watch and scanning the snapshot, and
//! intermediate values already overwritten, whose final value arrives as its
//! own event.

use super::path;
use super::traits::{CoordinationStore, Subscription};
use super::types::{StoreError, StoreNotification, StoreResult, StoreType};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tokio::sync::mpsc;

/// How often an idle watcher thread checks whether its subscriber went away
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Sled-backed coordination store handle
#[derive(Clone)]
pub struct SledCoordinationStore {
    tree: sled::Tree,
}

fn backend(e: sled::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl SledCoordinationStore {
    /// Open (or create) the database at `path` and use the tree for `namespace`
    pub fn open<P: AsRef<Path>>(path: P, namespace: &str) -> StoreResult<Self> {
        let db = sled::open(path).map_err(backend)?;
        Self::from_db(&db, namespace)
    }

    /// Share an already opened database, e.g. between nodes of one process
    pub fn from_db(db: &sled::Db, namespace: &str) -> StoreResult<Self> {
        let namespace = namespace.trim_matches('/');
        if namespace.is_empty() {
            return Err(StoreError::InvalidPath(
                "sled store requires a non-empty namespace".to_string(),
            ));
        }
        let tree = db.open_tree(namespace).map_err(backend)?;
        Ok(Self { tree })
    }

    fn snapshot(&self, root: &str) -> StoreResult<BTreeMap<String, Vec<u8>>> {
        let mut known = BTreeMap::new();
        for entry in self.tree.scan_prefix(root.as_bytes()) {
            let (key, value) = entry.map_err(backend)?;
            let key = String::from_utf8_lossy(&key).to_string();
            if path::is_within(root, &key) {
                known.insert(key, value.to_vec());
            }
        }
        Ok(known)
    }
}

#[async_trait]
impl CoordinationStore for SledCoordinationStore {
    async fn get(&self, node: &str) -> StoreResult<Vec<u8>> {
        path::validate(node)?;
        self.tree
            .get(node.as_bytes())
            .map_err(backend)?
            .map(|v| v.to_vec())
            .ok_or_else(|| StoreError::NoNode(node.to_string()))
    }

    async fn exists(&self, node: &str) -> StoreResult<bool> {
        path::validate(node)?;
        self.tree.contains_key(node.as_bytes()).map_err(backend)
    }

    async fn children(&self, node: &str) -> StoreResult<Vec<String>> {
        path::validate(node)?;
        if node != "/" && !self.tree.contains_key(node.as_bytes()).map_err(backend)? {
            return Err(StoreError::NoNode(node.to_string()));
        }
        let prefix = path::descendant_prefix(node);
        let mut names = Vec::new();
        for entry in self.tree.scan_prefix(prefix.as_bytes()) {
            let (key, _) = entry.map_err(backend)?;
            let key = String::from_utf8_lossy(&key).to_string();
            if let Some(name) = path::direct_child_name(node, &key) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    async fn create_or_set(&self, node: &str, data: &[u8]) -> StoreResult<()> {
        path::validate(node)?;
        if node == "/" {
            return Err(StoreError::InvalidPath("cannot write the root node".to_string()));
        }
        for ancestor in path::ancestors(node) {
            // Only creates the parent when absent; an existing parent keeps its data
            let _ = self
                .tree
                .compare_and_swap(ancestor.as_bytes(), None::<&[u8]>, Some(Vec::<u8>::new()))
                .map_err(backend)?;
        }
        self.tree.insert(node.as_bytes(), data).map_err(backend)?;
        self.tree.flush().map_err(backend)?;
        Ok(())
    }

    async fn delete_recursive(&self, node: &str) -> StoreResult<()> {
        path::validate(node)?;
        if !self.tree.contains_key(node.as_bytes()).map_err(backend)? {
            return Err(StoreError::NoNode(node.to_string()));
        }
        let prefix = path::descendant_prefix(node);
        let mut doomed = Vec::new();
        for entry in self.tree.scan_prefix(prefix.as_bytes()) {
            let (key, _) = entry.map_err(backend)?;
            doomed.push(key);
        }
        for key in doomed.into_iter().rev() {
            self.tree.remove(key).map_err(backend)?;
        }
        self.tree.remove(node.as_bytes()).map_err(backend)?;
        self.tree.flush().map_err(backend)?;
        Ok(())
    }

    async fn subscribe(&self, root: &str) -> StoreResult<Subscription> {
        path::validate(root)?;
        // Register before scanning so nothing between the two is missed
        let subscriber = self.tree.watch_prefix(root.as_bytes());
        let known = self.snapshot(root)?;

        let (sender, receiver) = mpsc::unbounded_channel();
        for (key, data) in &known {
            let _ = sender.send(StoreNotification::NodeAdded {
                path: key.clone(),
                data: data.clone(),
            });
        }
        let _ = sender.send(StoreNotification::Initialized);

        let watcher = SubtreeWatcher {
            tree: self.tree.clone(),
            root: root.to_string(),
            known,
            sender,
        };
        std::thread::Builder::new()
            .name(format!("sled-watch{}", root))
            .spawn(move || watcher.run(subscriber))
            .map_err(|e| StoreError::Backend(format!("failed to start watcher: {}", e)))?;

        Ok(Subscription::new(root, receiver))
    }

    fn store_type(&self) -> StoreType {
        StoreType::Sled
    }
}

/// Classifies raw sled events for one subscription
struct SubtreeWatcher {
    tree: sled::Tree,
    root: String,
    known: BTreeMap<String, Vec<u8>>,
    sender: mpsc::UnboundedSender<StoreNotification>,
}

impl SubtreeWatcher {
    fn run(mut self, mut subscriber: sled::Subscriber) {
        loop {
            if self.sender.is_closed() {
                log::debug!("Subscription on '{}' dropped, stopping watcher", self.root);
                return;
            }
            match subscriber.next_timeout(WATCH_POLL_INTERVAL) {
                Ok(event) => {
                    if let Some(notification) = self.classify(event) {
                        if self.sender.send(notification).is_err() {
                            return;
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    let _ = self.sender.send(StoreNotification::ConnectionLost {
                        reason: format!("sled watcher for '{}' disconnected", self.root),
                    });
                    return;
                }
            }
        }
    }

    fn classify(&mut self, event: sled::Event) -> Option<StoreNotification> {
        match event {
            sled::Event::Insert { key, value } => {
                let key = String::from_utf8_lossy(&key).to_string();
                if !path::is_within(&self.root, &key) || !self.is_current(&key, Some(&value[..])) {
                    return None;
                }
                let data = value.to_vec();
                match self.known.insert(key.clone(), data.clone()) {
                    // Replayed by the snapshot already
                    Some(old_data) if old_data == data => None,
                    Some(old_data) => Some(StoreNotification::NodeUpdated {
                        path: key,
                        old_data,
                        data,
                    }),
                    None => Some(StoreNotification::NodeAdded { path: key, data }),
                }
            }
            sled::Event::Remove { key } => {
                let key = String::from_utf8_lossy(&key).to_string();
                if !self.is_current(&key, None) {
                    return None;
                }
                self.known
                    .remove(&key)
                    .map(|data| StoreNotification::NodeRemoved { path: key, data })
            }
        }
    }

    /// True if the tree still holds `value` (or nothing, for `None`) at `key`
    fn is_current(&self, key: &str, value: Option<&[u8]>) -> bool {
        match self.tree.get(key.as_bytes()) {
            Ok(current) => current.as_deref() == value,
            Err(e) => {
                log::warn!("Cannot read '{}' while classifying a watch event: {}", key, e);
                true
            }
        }
    }
}
