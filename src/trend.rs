use anyhow::Result;
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    aggregate::{self, DailyTrendPoint},
    cli::TrendArgs,
    data, filter, table,
};

pub fn execute(args: &TrendArgs) -> Result<()> {
    let dataset = data::load_dataset(&args.dataset)?;
    let filtered = filter::select_range(
        &dataset.lines,
        args.dataset.start.as_deref(),
        args.dataset.end.as_deref(),
    )?;
    let points = aggregate::daily_trend(&filtered);
    let total_orders = aggregate::distinct_order_count(&filtered);
    let total_revenue = aggregate::total_revenue(&filtered);

    if args.json {
        let payload = TrendPayload {
            total_orders,
            total_revenue,
            daily: &points,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Total orders:  {total_orders}");
        println!("Total revenue: {}", money(&total_revenue));
        println!();
        table::print_table(&trend_headers(), &trend_rows(&points));
    }
    info!(
        "Computed daily trend for {} day(s) across {} order line(s)",
        points.len(),
        filtered.len()
    );
    Ok(())
}

#[derive(Serialize)]
struct TrendPayload<'a> {
    total_orders: u64,
    total_revenue: Decimal,
    daily: &'a [DailyTrendPoint],
}

pub(crate) fn trend_headers() -> Vec<String> {
    vec![
        "date".to_string(),
        "orders".to_string(),
        "revenue".to_string(),
    ]
}

pub(crate) fn trend_rows(points: &[DailyTrendPoint]) -> Vec<Vec<String>> {
    points
        .iter()
        .map(|point| {
            vec![
                point.date.format("%Y-%m-%d").to_string(),
                point.order_count.to_string(),
                money(&point.revenue),
            ]
        })
        .collect()
}

fn money(value: &Decimal) -> String {
    value.round_dp(2).to_string()
}
