use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    aggregate::{self, CustomerRfm},
    cli::RfmArgs,
    data, filter, table,
};

pub fn execute(args: &RfmArgs) -> Result<()> {
    let dataset = data::load_dataset(&args.dataset)?;
    let filtered = filter::select_range(
        &dataset.lines,
        args.dataset.start.as_deref(),
        args.dataset.end.as_deref(),
    )?;
    // The empty selection is valid output, not an error; there is just no
    // reference date to segment against.
    let (reference, segments) = match aggregate::reference_date(&filtered) {
        Some(reference) => (
            Some(reference),
            aggregate::rfm_segmentation(&filtered, reference),
        ),
        None => (None, Vec::new()),
    };
    let averages = averages(&segments);

    if args.json {
        let payload = RfmPayload {
            reference_date: reference,
            averages: averages.as_ref(),
            customers: &segments,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        render_text(args, reference, &segments, averages.as_ref());
    }
    info!("Segmented {} customer(s) by RFM", segments.len());
    Ok(())
}

fn render_text(
    args: &RfmArgs,
    reference: Option<NaiveDate>,
    segments: &[CustomerRfm],
    averages: Option<&RfmAverages>,
) {
    if let Some(reference) = reference {
        println!("Reference date: {reference}");
    }
    if let Some(averages) = averages {
        println!("Average recency:   {:.1} day(s)", averages.recency_days);
        println!("Average frequency: {:.2}", averages.frequency);
        println!("Average monetary:  {}", money(&averages.monetary));
    }
    println!();

    if args.full {
        println!("Customer segmentation");
        table::print_table(&segment_headers(), &segment_rows(segments));
        return;
    }

    println!("Best customers by recency (days, lower is better)");
    table::print_table(
        &segment_headers(),
        &segment_rows(&aggregate::best_by_recency(segments, args.top)),
    );
    println!();
    println!("Best customers by frequency");
    table::print_table(
        &segment_headers(),
        &segment_rows(&aggregate::best_by_frequency(segments, args.top)),
    );
    println!();
    println!("Best customers by monetary");
    table::print_table(
        &segment_headers(),
        &segment_rows(&aggregate::best_by_monetary(segments, args.top)),
    );
}

#[derive(Serialize)]
struct RfmPayload<'a> {
    reference_date: Option<NaiveDate>,
    averages: Option<&'a RfmAverages>,
    customers: &'a [CustomerRfm],
}

#[derive(Debug, Serialize)]
pub(crate) struct RfmAverages {
    pub recency_days: f64,
    pub frequency: f64,
    pub monetary: Decimal,
}

pub(crate) fn averages(segments: &[CustomerRfm]) -> Option<RfmAverages> {
    if segments.is_empty() {
        return None;
    }
    let count = segments.len();
    let recency_total: i64 = segments.iter().map(|segment| segment.recency_days).sum();
    let frequency_total: u64 = segments.iter().map(|segment| segment.frequency).sum();
    let monetary_total = segments
        .iter()
        .fold(Decimal::ZERO, |total, segment| total + segment.monetary);
    Some(RfmAverages {
        recency_days: recency_total as f64 / count as f64,
        frequency: frequency_total as f64 / count as f64,
        monetary: (monetary_total / Decimal::from(count as u64)).round_dp(2),
    })
}

pub(crate) fn segment_headers() -> Vec<String> {
    vec![
        "customer_id".to_string(),
        "last_purchase".to_string(),
        "frequency".to_string(),
        "monetary".to_string(),
        "recency_days".to_string(),
    ]
}

pub(crate) fn segment_rows(segments: &[CustomerRfm]) -> Vec<Vec<String>> {
    segments
        .iter()
        .map(|segment| {
            vec![
                segment.customer_id.clone(),
                segment.last_purchase.format("%Y-%m-%d").to_string(),
                segment.frequency.to_string(),
                money(&segment.monetary),
                segment.recency_days.to_string(),
            ]
        })
        .collect()
}

fn money(value: &Decimal) -> String {
    value.round_dp(2).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn segment(customer: &str, recency: i64, frequency: u64, monetary: &str) -> CustomerRfm {
        CustomerRfm {
            customer_id: customer.to_string(),
            last_purchase: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            frequency,
            monetary: monetary.parse().unwrap(),
            recency_days: recency,
        }
    }

    #[test]
    fn averages_cover_all_three_parameters() {
        let segments = vec![
            segment("A", 2, 1, "15"),
            segment("B", 0, 3, "20"),
        ];
        let averages = averages(&segments).unwrap();
        assert_eq!(averages.recency_days, 1.0);
        assert_eq!(averages.frequency, 2.0);
        assert_eq!(averages.monetary, Decimal::new(1750, 2));
    }

    #[test]
    fn averages_of_no_segments_is_none() {
        assert!(averages(&[]).is_none());
    }
}
