use anyhow::{Result, anyhow};
use log::info;
use serde::Serialize;

use crate::{
    aggregate::{self, CityDistribution},
    cli::CityArgs,
    data, filter, table,
};

pub fn execute(args: &CityArgs) -> Result<()> {
    let dataset = data::load_dataset(&args.dataset)?;
    if !dataset.has_city() {
        return Err(anyhow!(
            "Input has no customer_city column; geographic distribution is unavailable for this export"
        ));
    }
    let filtered = filter::select_range(
        &dataset.lines,
        args.dataset.start.as_deref(),
        args.dataset.end.as_deref(),
    )?;
    let distribution = aggregate::city_distribution(&filtered);

    if args.json {
        let payload = CityPayload {
            cities: &distribution,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Customers by city");
        table::print_table(
            &distribution_headers(),
            &distribution_rows(&aggregate::top_cities(&distribution, args.top)),
        );
    }
    info!("Computed customer counts for {} cit(ies)", distribution.len());
    Ok(())
}

#[derive(Serialize)]
struct CityPayload<'a> {
    cities: &'a [CityDistribution],
}

pub(crate) fn distribution_headers() -> Vec<String> {
    vec!["city".to_string(), "customers".to_string()]
}

pub(crate) fn distribution_rows(entries: &[CityDistribution]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|entry| vec![entry.city.clone(), entry.customer_count.to_string()])
        .collect()
}
