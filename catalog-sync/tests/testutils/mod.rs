//! Test utilities for catalog-sync integration tests
//!
//! - ClusterFixture: several nodes sharing one in-memory coordination ensemble
//! - wait helpers for the asynchronous convergence loop

pub mod cluster_fixture;
