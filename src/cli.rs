use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze e-commerce order exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render the combined report: trend, categories, cities, and RFM
    Report(ReportArgs),
    /// Daily order counts and revenue across the selected range
    Trend(TrendArgs),
    /// Best and worst performing product categories by revenue
    Categories(CategoryArgs),
    /// Customer distribution across cities
    Cities(CityArgs),
    /// Recency/Frequency/Monetary customer segmentation
    Rfm(RfmArgs),
}

#[derive(Debug, Args)]
pub struct DatasetArgs {
    /// Input CSV file of order lines ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Start of the inclusive date range (defaults to the earliest purchase)
    #[arg(long)]
    pub start: Option<String>,
    /// End of the inclusive date range (defaults to the latest purchase)
    #[arg(long)]
    pub end: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// YAML file extending the column alias map for nonstandard exports
    #[arg(long = "schema-map")]
    pub schema_map: Option<PathBuf>,
    /// Maximum rows to ingest (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Entries to show in each best/worst/top cut
    #[arg(long, default_value_t = 5)]
    pub top: usize,
    /// Emit the derived tables as JSON instead of text tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Emit the daily trend as JSON instead of a text table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Entries to show in the best and worst performer tables
    #[arg(long, default_value_t = 5)]
    pub top: usize,
    /// Emit the full ranked table as JSON instead of text tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CityArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Cities to show, ranked by distinct customers
    #[arg(long, default_value_t = 5)]
    pub top: usize,
    /// Emit the full distribution as JSON instead of a text table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RfmArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Customers to show in each best-by cut
    #[arg(long, default_value_t = 5)]
    pub top: usize,
    /// Print the whole per-customer segmentation table
    #[arg(long)]
    pub full: bool,
    /// Emit the segmentation as JSON instead of text tables
    #[arg(long)]
    pub json: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
