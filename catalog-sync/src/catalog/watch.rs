// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog watch dispatcher
//!
//! Turns the raw notifications of a subtree subscription into typed
//! [`WatchEvent`]s and hands them to the lifecycle manager through a bounded
//! channel. The initial snapshot arrives as ordinary `Added` events, so bulk
//! load and live updates share one path. A full channel back-pressures the
//! dispatcher, never the store.

use super::error::{CatalogError, CatalogResult};
use crate::store::{StoreNotification, Subscription};
use tokio::sync::mpsc;

/// Typed structural change below the watched root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Added {
        path: String,
        data: Vec<u8>,
    },
    Updated {
        path: String,
        old_data: Vec<u8>,
        data: Vec<u8>,
    },
    Removed {
        path: String,
        data: Vec<u8>,
    },
}

impl WatchEvent {
    pub fn path(&self) -> &str {
        match self {
            WatchEvent::Added { path, .. }
            | WatchEvent::Updated { path, .. }
            | WatchEvent::Removed { path, .. } => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WatchEvent::Added { .. } => "added",
            WatchEvent::Updated { .. } => "updated",
            WatchEvent::Removed { .. } => "removed",
        }
    }
}

/// Classify one raw notification against the watched root
///
/// Returns `Ok(None)` for notifications that carry no catalog identity (the
/// root itself, the snapshot marker, anything outside the root) and an error
/// once the subscription can no longer deliver.
pub fn classify(root: &str, notification: StoreNotification) -> CatalogResult<Option<WatchEvent>> {
    let event = match notification {
        StoreNotification::NodeAdded { path, data } => WatchEvent::Added { path, data },
        StoreNotification::NodeUpdated {
            path,
            old_data,
            data,
        } => WatchEvent::Updated {
            path,
            old_data,
            data,
        },
        StoreNotification::NodeRemoved { path, data } => WatchEvent::Removed { path, data },
        StoreNotification::Initialized => {
            log::debug!("Initial snapshot of '{}' delivered", root);
            return Ok(None);
        }
        StoreNotification::ConnectionLost { reason } => {
            return Err(CatalogError::WatchTerminated(reason));
        }
    };

    let path = event.path();
    if path == root || !crate::store::path::is_within(root, path) {
        return Ok(None);
    }
    Ok(Some(event))
}

/// Pumps one subscription into the lifecycle manager's event queue
pub struct CatalogWatchDispatcher {
    subscription: Subscription,
    events: mpsc::Sender<WatchEvent>,
}

impl CatalogWatchDispatcher {
    pub fn new(subscription: Subscription, events: mpsc::Sender<WatchEvent>) -> Self {
        Self {
            subscription,
            events,
        }
    }

    /// Forward events until the consumer goes away or the subscription fails
    ///
    /// # Returns
    /// * `Ok(())` when the receiving side was closed (engine shutdown)
    /// * `Err(CatalogError::WatchTerminated)` when the store connection was lost
    ///   or the store closed the subscription
    pub async fn run(mut self) -> CatalogResult<()> {
        let root = self.subscription.root().to_string();
        log::debug!("Watching catalog subtree '{}'", root);

        loop {
            let notification = tokio::select! {
                _ = self.events.closed() => {
                    log::debug!("Event consumer for '{}' closed, unsubscribing", root);
                    return Ok(());
                }
                notification = self.subscription.next() => notification,
            };

            let notification = notification.ok_or_else(|| {
                CatalogError::WatchTerminated(format!("subscription on '{}' closed by store", root))
            })?;

            if let Some(event) = classify(&root, notification)? {
                log::debug!("Dispatching {} event for '{}'", event.kind(), event.path());
                if self.events.send(event).await.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CoordinationStore, MemoryCoordinationStore};

    const ROOT: &str = "/catalog/meta";

    #[test]
    fn test_root_and_marker_are_dropped() {
        let root_added = StoreNotification::NodeAdded {
            path: ROOT.to_string(),
            data: Vec::new(),
        };
        assert_eq!(classify(ROOT, root_added).unwrap(), None);
        assert_eq!(classify(ROOT, StoreNotification::Initialized).unwrap(), None);

        let sibling = StoreNotification::NodeAdded {
            path: "/catalog/metadata".to_string(),
            data: Vec::new(),
        };
        assert_eq!(classify(ROOT, sibling).unwrap(), None);
    }

    #[test]
    fn test_updated_keeps_both_payloads() {
        let event = classify(
            ROOT,
            StoreNotification::NodeUpdated {
                path: "/catalog/meta/sales".to_string(),
                old_data: b"old".to_vec(),
                data: b"new".to_vec(),
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            event,
            WatchEvent::Updated {
                path: "/catalog/meta/sales".to_string(),
                old_data: b"old".to_vec(),
                data: b"new".to_vec(),
            }
        );
    }

    #[test]
    fn test_connection_loss_is_terminal() {
        let lost = StoreNotification::ConnectionLost {
            reason: "session expired".to_string(),
        };
        assert!(matches!(
            classify(ROOT, lost),
            Err(CatalogError::WatchTerminated(_))
        ));
    }

    #[tokio::test]
    async fn test_run_forwards_snapshot_and_live_events() {
        let store = MemoryCoordinationStore::new("trino");
        store.create_or_set("/catalog/meta/a", b"1").await.unwrap();

        let subscription = store.subscribe(ROOT).await.unwrap();
        let (sender, mut receiver) = mpsc::channel(4);
        let handle = tokio::spawn(CatalogWatchDispatcher::new(subscription, sender).run());

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.path(), "/catalog/meta/a");
        assert_eq!(first.kind(), "added");

        store.delete_recursive("/catalog/meta/a").await.unwrap();
        let second = receiver.recv().await.unwrap();
        assert_eq!(second.kind(), "removed");

        drop(receiver);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_run_surfaces_session_expiry() {
        let store = MemoryCoordinationStore::new("trino");
        let subscription = store.subscribe(ROOT).await.unwrap();
        let (sender, _receiver) = mpsc::channel(4);
        let handle = tokio::spawn(CatalogWatchDispatcher::new(subscription, sender).run());

        store.ensemble().expire_sessions();
        assert!(matches!(
            handle.await.unwrap(),
            Err(CatalogError::WatchTerminated(_))
        ));
    }
}
