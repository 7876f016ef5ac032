// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use super::commands::OutputFormat;
use catalog_sync::CatalogDefinition;

pub struct CatalogFormatter;

impl CatalogFormatter {
    pub fn format(definitions: &[CatalogDefinition], format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::format_table(definitions),
            OutputFormat::Json => Self::format_json(definitions),
        }
    }

    fn format_table(definitions: &[CatalogDefinition]) -> String {
        if definitions.is_empty() {
            return format!("{}\n", "No catalogs stored".yellow());
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Catalog").fg(Color::Green),
            Cell::new("Connector").fg(Color::Green),
            Cell::new("Properties").fg(Color::Green),
        ]);

        for definition in definitions {
            let properties: Vec<String> = definition
                .properties()
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            table.add_row(vec![
                Cell::new(definition.catalog_name()),
                Cell::new(definition.connector_name()),
                Cell::new(properties.join("\n")),
            ]);
        }

        format!(
            "{}\n{}\n",
            format!("{} catalog(s)", definitions.len()).bold().green(),
            table
        )
    }

    fn format_json(definitions: &[CatalogDefinition]) -> String {
        match serde_json::to_string_pretty(definitions) {
            Ok(json) => format!("{}\n", json),
            Err(e) => format!("{}\n", format!("Failed to serialize catalogs: {}", e).red()),
        }
    }
}
