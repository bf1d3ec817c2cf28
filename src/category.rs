use anyhow::Result;
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    aggregate::{self, CategoryPerformance},
    cli::CategoryArgs,
    data, filter, table,
};

pub fn execute(args: &CategoryArgs) -> Result<()> {
    let dataset = data::load_dataset(&args.dataset)?;
    let filtered = filter::select_range(
        &dataset.lines,
        args.dataset.start.as_deref(),
        args.dataset.end.as_deref(),
    )?;
    let ranked = aggregate::category_performance(&filtered);

    if args.json {
        let payload = CategoryPayload { categories: &ranked };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Best performing categories");
        table::print_table(
            &performance_headers(),
            &performance_rows(&aggregate::best_categories(&ranked, args.top)),
        );
        println!();
        println!("Worst performing categories");
        table::print_table(
            &performance_headers(),
            &performance_rows(&aggregate::worst_categories(&ranked, args.top)),
        );
    }
    info!("Ranked {} categor(ies) by revenue", ranked.len());
    Ok(())
}

#[derive(Serialize)]
struct CategoryPayload<'a> {
    categories: &'a [CategoryPerformance],
}

pub(crate) fn performance_headers() -> Vec<String> {
    vec!["category".to_string(), "total_revenue".to_string()]
}

pub(crate) fn performance_rows(entries: &[CategoryPerformance]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|entry| vec![entry.category.clone(), money(&entry.total_revenue)])
        .collect()
}

fn money(value: &Decimal) -> String {
    value.round_dp(2).to_string()
}
