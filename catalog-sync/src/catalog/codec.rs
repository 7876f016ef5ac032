// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! JSON codec for catalog definitions stored in the coordination store

use super::definition::CatalogDefinition;
use super::error::{CatalogError, CatalogResult};

/// Serialize a definition into the blob stored at `{root}/{catalogName}`
pub fn encode(definition: &CatalogDefinition) -> CatalogResult<Vec<u8>> {
    serde_json::to_vec(definition).map_err(|e| CatalogError::Decode(e.to_string()))
}

/// Reconstruct a definition from a stored blob
///
/// Structural problems and missing or empty fields both surface as
/// [`CatalogError::Decode`]; a stored blob never produces a validation error.
pub fn decode(bytes: &[u8]) -> CatalogResult<CatalogDefinition> {
    serde_json::from_slice(bytes).map_err(|e| CatalogError::Decode(e.to_string()))
}
