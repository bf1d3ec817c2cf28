//! The canonical order-line record and the normalizer that produces it.
//!
//! [`read_order_lines()`] turns a raw export into typed [`OrderLine`] rows:
//! headers resolve through [`crate::schema::ColumnMap`], timestamps and
//! monetary amounts parse strictly, and any row missing a required field
//! fails the whole load with its row number. Silently dropping rows would
//! make the aggregation totals unauditable, so the normalizer refuses to.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, NaiveDateTime};
use encoding_rs::Encoding;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    cli::DatasetArgs,
    io_utils,
    schema::{AliasMap, ColumnMap},
};

/// Sentinel category applied when the source schema has no category column
/// or the cell is blank.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// One purchased item. An order with several lines repeats its `order_id`
/// across rows; aggregations that count orders must deduplicate on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub order_id: String,
    pub customer_id: String,
    pub purchased_at: NaiveDateTime,
    pub category: String,
    pub line_value: Decimal,
    pub customer_city: Option<String>,
}

/// A fully normalized export: the rows plus the column resolution that
/// produced them, so callers can tell which optional fields the variant
/// actually carried.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub lines: Vec<OrderLine>,
    pub columns: ColumnMap,
}

impl Dataset {
    pub fn has_city(&self) -> bool {
        self.columns.customer_city.is_some()
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

/// Purchase timestamps arrive as full datetimes in most exports, but some
/// cut-down extracts keep only the day; those land at midnight.
pub fn parse_purchase_timestamp(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    if let Ok(parsed) = parse_naive_date(value) {
        return Ok(parsed.and_hms_opt(0, 0, 0).expect("midnight is valid"));
    }
    Err(anyhow!("Failed to parse '{value}' as purchase timestamp"))
}

pub fn parse_money(value: &str) -> Result<Decimal> {
    let parsed: Decimal = value
        .trim()
        .parse()
        .with_context(|| format!("Failed to parse '{value}' as monetary amount"))?;
    if parsed.is_sign_negative() {
        bail!("Monetary amount '{value}' is negative");
    }
    Ok(parsed)
}

pub fn read_order_lines(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
    aliases: &AliasMap,
    limit: usize,
) -> Result<Dataset> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let columns = ColumnMap::resolve(&headers, aliases)
        .with_context(|| format!("Resolving order-line columns for {path:?}"))?;

    let mut lines = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        if limit > 0 && row_idx >= limit {
            break;
        }
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)?;
        let line = parse_order_line(&decoded, &columns)
            .with_context(|| format!("Parsing row {}", row_idx + 2))?;
        lines.push(line);
    }
    debug!("Normalized {} order line(s) from {path:?}", lines.len());
    Ok(Dataset { lines, columns })
}

/// Resolves delimiter, encoding, and alias map from the shared CLI arguments
/// and loads the input. Every subcommand starts here.
pub fn load_dataset(args: &DatasetArgs) -> Result<Dataset> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let aliases = match &args.schema_map {
        Some(path) => AliasMap::load(path)?,
        None => AliasMap::default(),
    };
    read_order_lines(&args.input, delimiter, encoding, &aliases, args.limit)
}

fn parse_order_line(record: &[String], columns: &ColumnMap) -> Result<OrderLine> {
    let order_id = required_cell(record, columns.order_id, "order_id")?;
    let customer_id = required_cell(record, columns.customer_id, "customer_id")?;
    let timestamp_raw = required_cell(record, columns.purchased_at, "order_purchase_timestamp")?;
    let value_raw = required_cell(record, columns.line_value, "line_value")?;

    let category = columns
        .category
        .and_then(|idx| optional_cell(record, idx))
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
    let customer_city = columns
        .customer_city
        .and_then(|idx| optional_cell(record, idx));

    Ok(OrderLine {
        order_id,
        customer_id,
        purchased_at: parse_purchase_timestamp(&timestamp_raw)?,
        category,
        line_value: parse_money(&value_raw)?,
        customer_city,
    })
}

fn required_cell(record: &[String], idx: usize, field: &str) -> Result<String> {
    let value = record.get(idx).map(|cell| cell.trim()).unwrap_or("");
    if value.is_empty() {
        bail!("Row is missing required field '{field}'");
    }
    Ok(value.to_string())
}

fn optional_cell(record: &[String], idx: usize) -> Option<String> {
    let value = record.get(idx)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
