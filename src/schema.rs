//! Column resolution for the order-line schema variants in the wild.
//!
//! Exports of the same order data disagree on column names: the line amount
//! ships as `price` or `total_value`, the category as
//! `product_category_name_english` or `product_category_name`, and the
//! customer key as `customer_unique_id` or `customer_id`. All of that is
//! settled here, once, against the header row; downstream code sees a single
//! canonical [`ColumnMap`] and never branches on input shape.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("No {field} column found; expected one of: {expected}")]
    MissingColumn { field: &'static str, expected: String },
}

/// Header aliases accepted for each logical order-line field, in preference
/// order. The defaults cover the known dataset variants; a `--schema-map`
/// YAML file can prepend site-specific names.
#[derive(Debug, Clone)]
pub struct AliasMap {
    pub order_id: Vec<String>,
    pub customer_id: Vec<String>,
    pub purchased_at: Vec<String>,
    pub line_value: Vec<String>,
    pub category: Vec<String>,
    pub customer_city: Vec<String>,
}

impl Default for AliasMap {
    fn default() -> Self {
        Self {
            order_id: vec!["order_id".to_string()],
            // customer_unique_id is the stable customer key; customer_id is a
            // per-order surrogate in some variants and only a fallback here.
            customer_id: vec![
                "customer_unique_id".to_string(),
                "customer_id".to_string(),
            ],
            purchased_at: vec!["order_purchase_timestamp".to_string()],
            line_value: vec!["price".to_string(), "total_value".to_string()],
            category: vec![
                "product_category_name_english".to_string(),
                "product_category_name".to_string(),
            ],
            customer_city: vec!["customer_city".to_string()],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AliasOverlay {
    order_id: Vec<String>,
    customer_id: Vec<String>,
    purchased_at: Vec<String>,
    line_value: Vec<String>,
    category: Vec<String>,
    customer_city: Vec<String>,
}

impl AliasMap {
    /// Loads a YAML overlay and prepends its aliases to the defaults, so
    /// user-supplied names win when both would match.
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Opening schema map {path:?}"))?;
        let overlay: AliasOverlay = serde_yaml::from_reader(file)
            .with_context(|| format!("Parsing schema map {path:?}"))?;
        let mut map = Self::default();
        prepend(&mut map.order_id, overlay.order_id);
        prepend(&mut map.customer_id, overlay.customer_id);
        prepend(&mut map.purchased_at, overlay.purchased_at);
        prepend(&mut map.line_value, overlay.line_value);
        prepend(&mut map.category, overlay.category);
        prepend(&mut map.customer_city, overlay.customer_city);
        Ok(map)
    }
}

fn prepend(aliases: &mut Vec<String>, mut extra: Vec<String>) {
    if !extra.is_empty() {
        extra.extend(aliases.drain(..));
        *aliases = extra;
    }
}

/// Resolved header positions for one input file. Optional fields stay `None`
/// when the variant does not carry them; callers decide whether the
/// corresponding aggregation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub order_id: usize,
    pub customer_id: usize,
    pub purchased_at: usize,
    pub line_value: usize,
    pub category: Option<usize>,
    pub customer_city: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(headers: &[String], aliases: &AliasMap) -> Result<Self, SchemaError> {
        let normalized = headers
            .iter()
            .map(|header| normalize_column_name(header))
            .collect::<Vec<_>>();

        let customer_id = find_required(&normalized, &aliases.customer_id, "customer id")?;
        debug!(
            "Customer key resolved to header '{}'",
            headers[customer_id].trim()
        );

        Ok(Self {
            order_id: find_required(&normalized, &aliases.order_id, "order id")?,
            customer_id,
            purchased_at: find_required(
                &normalized,
                &aliases.purchased_at,
                "purchase timestamp",
            )?,
            line_value: find_required(&normalized, &aliases.line_value, "line value")?,
            category: find_optional(&normalized, &aliases.category),
            customer_city: find_optional(&normalized, &aliases.customer_city),
        })
    }
}

fn find_required(
    normalized: &[String],
    aliases: &[String],
    field: &'static str,
) -> Result<usize, SchemaError> {
    find_optional(normalized, aliases).ok_or_else(|| SchemaError::MissingColumn {
        field,
        expected: aliases.join(", "),
    })
}

fn find_optional(normalized: &[String], aliases: &[String]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        let alias = normalize_column_name(alias);
        normalized.iter().position(|header| *header == alias)
    })
}

pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => c,
            _ => '_',
        })
        .collect::<String>()
        .to_ascii_lowercase()
}
