// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog definition data model
//!
//! A [`CatalogDefinition`] is the unit of configuration stored under the watched
//! root. It can only be built through validation, so holding one means the
//! name, connector and properties are all present. Updates replace the whole
//! definition; there are no setters.
//!
//! The stricter naming rule in [`validate_catalog_name`] applies to new
//! submissions only. Definitions already in the store are read as long as their
//! fields are present, whichever tool wrote them.

use super::error::{CatalogError, CatalogResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static CATALOG_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("static pattern"));

/// Immutable, validated catalog definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CatalogDefinitionRequest")]
pub struct CatalogDefinition {
    catalog_name: String,
    connector_name: String,
    properties: BTreeMap<String, String>,
}

/// Unvalidated wire shape of a catalog definition
///
/// Every field is optional so a missing field surfaces as a validation error
/// naming the field instead of a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDefinitionRequest {
    pub catalog_name: Option<String>,
    pub connector_name: Option<String>,
    pub properties: Option<BTreeMap<String, String>>,
}

impl CatalogDefinition {
    /// Build a definition, rejecting empty fields
    pub fn new(
        catalog_name: impl Into<String>,
        connector_name: impl Into<String>,
        properties: BTreeMap<String, String>,
    ) -> CatalogResult<Self> {
        let catalog_name = catalog_name.into();
        let connector_name = connector_name.into();

        if catalog_name.trim().is_empty() {
            return Err(CatalogError::Validation("catalogName is empty".to_string()));
        }
        if connector_name.trim().is_empty() {
            return Err(CatalogError::Validation(
                "connectorName is empty".to_string(),
            ));
        }
        if properties.is_empty() {
            return Err(CatalogError::Validation(
                "properties is empty".to_string(),
            ));
        }

        Ok(Self {
            catalog_name,
            connector_name,
            properties,
        })
    }

    pub fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    pub fn connector_name(&self) -> &str {
        &self.connector_name
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

impl TryFrom<CatalogDefinitionRequest> for CatalogDefinition {
    type Error = CatalogError;

    fn try_from(request: CatalogDefinitionRequest) -> CatalogResult<Self> {
        let catalog_name = request
            .catalog_name
            .ok_or_else(|| CatalogError::Validation("catalogName is required".to_string()))?;
        let connector_name = request
            .connector_name
            .ok_or_else(|| CatalogError::Validation("connectorName is required".to_string()))?;
        let properties = request
            .properties
            .ok_or_else(|| CatalogError::Validation("properties is required".to_string()))?;
        Self::new(catalog_name, connector_name, properties)
    }
}

/// Naming rule for catalogs submitted through the management API
pub fn validate_catalog_name(name: &str) -> CatalogResult<()> {
    if name.contains('/') {
        return Err(CatalogError::Validation(format!(
            "catalog name '{}' must not contain '/'",
            name
        )));
    }
    if !CATALOG_NAME_PATTERN.is_match(name) {
        return Err(CatalogError::Validation(format!(
            "catalog name '{}' must match {}",
            name,
            CATALOG_NAME_PATTERN.as_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_new_validates_fields() {
        let ok = CatalogDefinition::new(
            "sales",
            "postgresql",
            props(&[("connection-url", "jdbc:x")]),
        );
        assert!(ok.is_ok());

        assert!(matches!(
            CatalogDefinition::new("", "postgresql", props(&[("a", "b")])),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            CatalogDefinition::new("sales", " ", props(&[("a", "b")])),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            CatalogDefinition::new("sales", "postgresql", BTreeMap::new()),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn test_catalog_name_rules() {
        assert!(validate_catalog_name("sales_2024.v1-eu").is_ok());
        assert!(validate_catalog_name("sales/eu").is_err());
        assert!(validate_catalog_name(".hidden").is_err());
        assert!(validate_catalog_name("with space").is_err());
    }

    #[test]
    fn test_stored_names_outside_submission_rule_still_build() {
        let definition =
            CatalogDefinition::new("sales eu", "memory", props(&[("a", "b")])).unwrap();
        assert_eq!(definition.catalog_name(), "sales eu");
        assert!(validate_catalog_name(definition.catalog_name()).is_err());
    }

    #[test]
    fn test_missing_field_is_named() {
        let request = CatalogDefinitionRequest {
            catalog_name: Some("sales".to_string()),
            connector_name: None,
            properties: Some(props(&[("a", "b")])),
        };
        match CatalogDefinition::try_from(request) {
            Err(CatalogError::Validation(message)) => assert!(message.contains("connectorName")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
