//! The combined report: one ingest, one date-range selection, and all four
//! aggregations over the same snapshot. The aggregators are independent of
//! one another, so section order here is presentation choice, nothing more.

use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    aggregate::{
        self, CategoryPerformance, CityDistribution, CustomerRfm, DailyTrendPoint,
    },
    category, city,
    cli::ReportArgs,
    data, filter,
    rfm::{self, RfmAverages},
    table, trend,
};

pub fn execute(args: &ReportArgs) -> Result<()> {
    let dataset = data::load_dataset(&args.dataset)?;
    let filtered = filter::select_range(
        &dataset.lines,
        args.dataset.start.as_deref(),
        args.dataset.end.as_deref(),
    )?;

    let daily = aggregate::daily_trend(&filtered);
    let ranked = aggregate::category_performance(&filtered);
    let cities = dataset
        .has_city()
        .then(|| aggregate::city_distribution(&filtered));
    let (reference, segments) = match aggregate::reference_date(&filtered) {
        Some(reference) => (
            Some(reference),
            aggregate::rfm_segmentation(&filtered, reference),
        ),
        None => (None, Vec::new()),
    };
    let averages = rfm::averages(&segments);

    if args.json {
        let payload = ReportPayload {
            total_orders: aggregate::distinct_order_count(&filtered),
            total_revenue: aggregate::total_revenue(&filtered),
            daily: &daily,
            best_categories: aggregate::best_categories(&ranked, args.top),
            worst_categories: aggregate::worst_categories(&ranked, args.top),
            top_cities: cities
                .as_deref()
                .map(|distribution| aggregate::top_cities(distribution, args.top)),
            rfm_reference_date: reference,
            rfm_averages: averages.as_ref(),
            best_by_recency: aggregate::best_by_recency(&segments, args.top),
            best_by_frequency: aggregate::best_by_frequency(&segments, args.top),
            best_by_monetary: aggregate::best_by_monetary(&segments, args.top),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        render_text(args, &filtered, &daily, &ranked, cities.as_deref(), reference, &segments, averages.as_ref());
    }
    info!(
        "Report covered {} order line(s): {} day(s), {} categor(ies), {} customer(s)",
        filtered.len(),
        daily.len(),
        ranked.len(),
        segments.len()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn render_text(
    args: &ReportArgs,
    filtered: &[data::OrderLine],
    daily: &[DailyTrendPoint],
    ranked: &[CategoryPerformance],
    cities: Option<&[CityDistribution]>,
    reference: Option<NaiveDate>,
    segments: &[CustomerRfm],
    averages: Option<&RfmAverages>,
) {
    section("Daily Orders & Revenue");
    println!(
        "Total orders:  {}",
        aggregate::distinct_order_count(filtered)
    );
    println!(
        "Total revenue: {}",
        aggregate::total_revenue(filtered).round_dp(2)
    );
    println!();
    table::print_table(&trend::trend_headers(), &trend::trend_rows(daily));
    println!();

    section("Best & Worst Performing Categories");
    println!("Best performing");
    table::print_table(
        &category::performance_headers(),
        &category::performance_rows(&aggregate::best_categories(ranked, args.top)),
    );
    println!();
    println!("Worst performing");
    table::print_table(
        &category::performance_headers(),
        &category::performance_rows(&aggregate::worst_categories(ranked, args.top)),
    );
    println!();

    section("Customer Demographics");
    match cities {
        Some(distribution) => {
            table::print_table(
                &city::distribution_headers(),
                &city::distribution_rows(&aggregate::top_cities(distribution, args.top)),
            );
        }
        None => println!("(input has no customer_city column; section skipped)"),
    }
    println!();

    section("Best Customers by RFM");
    if let Some(reference) = reference {
        println!("Reference date: {reference}");
    }
    if let Some(averages) = averages {
        println!("Average recency:   {:.1} day(s)", averages.recency_days);
        println!("Average frequency: {:.2}", averages.frequency);
        println!("Average monetary:  {}", averages.monetary);
    }
    println!();
    println!("By recency (days, lower is better)");
    table::print_table(
        &rfm::segment_headers(),
        &rfm::segment_rows(&aggregate::best_by_recency(segments, args.top)),
    );
    println!();
    println!("By frequency");
    table::print_table(
        &rfm::segment_headers(),
        &rfm::segment_rows(&aggregate::best_by_frequency(segments, args.top)),
    );
    println!();
    println!("By monetary");
    table::print_table(
        &rfm::segment_headers(),
        &rfm::segment_rows(&aggregate::best_by_monetary(segments, args.top)),
    );
}

fn section(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
}

#[derive(Serialize)]
struct ReportPayload<'a> {
    total_orders: u64,
    total_revenue: Decimal,
    daily: &'a [DailyTrendPoint],
    best_categories: Vec<CategoryPerformance>,
    worst_categories: Vec<CategoryPerformance>,
    top_cities: Option<Vec<CityDistribution>>,
    rfm_reference_date: Option<NaiveDate>,
    rfm_averages: Option<&'a RfmAverages>,
    best_by_recency: Vec<CustomerRfm>,
    best_by_frequency: Vec<CustomerRfm>,
    best_by_monetary: Vec<CustomerRfm>,
}
