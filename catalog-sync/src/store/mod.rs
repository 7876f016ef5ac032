// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Coordination store clients
//!
//! This module provides the trait-based abstraction over the external,
//! watch-capable coordination service that holds catalog definitions, so
//! different backends can be used interchangeably.
//!
//! # Architecture
//!
//! ```text
//! Management API / Lifecycle Manager
//!     ↓
//! CoordinationStore (paths, blobs, subtree subscriptions)
//!     ↓
//! Concrete Implementations (Memory ensemble, Sled)
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! use crate::store::{create_coordination_store, CoordinationStore};
//!
//! let store = create_coordination_store(&config)?;
//! store.create_or_set("/catalog/meta/sales", &bytes).await?;
//! let mut subscription = store.subscribe("/catalog/meta").await?;
//! while let Some(notification) = subscription.next().await { /* ... */ }
//! ```

// Core modules
pub mod factory;
pub mod path;
pub mod traits;
pub mod types;

// Backend implementations
pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;

// Public API re-exports
pub use factory::create_coordination_store;
pub use memory::{MemoryCoordinationStore, MemoryEnsemble};
pub use traits::{CoordinationStore, Subscription};
pub use types::{StoreError, StoreNotification, StoreResult, StoreType};

use std::time::Duration;

const DELETE_BACKOFF_BASE: Duration = Duration::from_millis(50);
const DELETE_BACKOFF_MAX: Duration = Duration::from_secs(2);

/// Delete `node` and its descendants, retrying until the deletion is observed
///
/// Connection losses are retried with jittered exponential back-off, up to
/// `max_retries` extra attempts. A missing node is reported as `NoNode` on the
/// first attempt; on a retry it means an earlier attempt already went through.
pub async fn delete_guaranteed(
    store: &dyn CoordinationStore,
    node: &str,
    max_retries: u32,
) -> StoreResult<()> {
    let mut attempt: u32 = 0;
    loop {
        let outcome = match store.delete_recursive(node).await {
            Ok(()) => store.exists(node).await.map(|present| !present),
            Err(StoreError::NoNode(_)) if attempt > 0 => Ok(true),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(true) => return Ok(()),
            Ok(false) => {
                log::debug!("Node '{}' still present after delete, retrying", node);
            }
            Err(e) if e.is_retryable() && attempt < max_retries => {
                log::warn!(
                    "Delete of '{}' failed (attempt {}): {}, retrying",
                    node,
                    attempt + 1,
                    e
                );
            }
            Err(e) => return Err(e),
        }

        if attempt >= max_retries {
            return Err(StoreError::ConnectionLoss(format!(
                "delete of '{}' not confirmed after {} attempts",
                node,
                attempt + 1
            )));
        }
        tokio::time::sleep(backoff(attempt)).await;
        attempt += 1;
    }
}

fn backoff(attempt: u32) -> Duration {
    let exponential = DELETE_BACKOFF_BASE.saturating_mul(1u32 << attempt.min(16));
    let capped = exponential.min(DELETE_BACKOFF_MAX);
    let jitter = fastrand::u64(0..=capped.as_millis() as u64 / 2);
    capped / 2 + Duration::from_millis(jitter)
}
