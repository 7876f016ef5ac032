// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cluster discovery integration

pub mod announcement;
pub mod announcer;

pub use announcement::{
    Announcer, MemoryAnnouncer, MemoryNodeManager, NodeManager, ServiceAnnouncement,
};
pub use announcer::{parse_connector_ids, CapabilityAnnouncer, CONNECTOR_IDS_PROPERTY};
