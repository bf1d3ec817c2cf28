pub mod aggregate;
pub mod category;
pub mod city;
pub mod cli;
pub mod data;
pub mod filter;
pub mod io_utils;
pub mod report;
pub mod rfm;
pub mod schema;
pub mod table;
pub mod trend;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("order_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Report(args) => report::execute(&args),
        Commands::Trend(args) => trend::execute(&args),
        Commands::Categories(args) => category::execute(&args),
        Commands::Cities(args) => city::execute(&args),
        Commands::Rfm(args) => rfm::execute(&args),
    }
}
