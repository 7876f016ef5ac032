// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for the catalog node
//!
//! Runs a synchronizing node with its management API, or inspects the
//! definitions stored for a configuration.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_catalogs, handle_serve};
