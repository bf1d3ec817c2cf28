use std::collections::HashSet;

use encoding_rs::UTF_8;
use itertools::Itertools;
use rust_decimal::Decimal;

use order_insights::aggregate::{
    self, best_by_frequency, best_by_monetary, best_by_recency, best_categories, top_cities,
    worst_categories,
};
use order_insights::data::read_order_lines;
use order_insights::filter;
use order_insights::schema::AliasMap;

mod common;

use common::TestWorkspace;

/// A month of orders across four customers, three cities, and four
/// categories, with multi-line orders and repeat purchases.
const MONTH_CSV: &str = "\
order_id,customer_unique_id,order_purchase_timestamp,product_category_name_english,price,customer_city
O1,A,2024-03-01 08:00:00,electronics,120.00,sydney
O1,A,2024-03-01 08:00:00,books,15.50,sydney
O2,B,2024-03-01 12:30:00,garden,42.00,melbourne
O3,A,2024-03-08 19:45:00,electronics,210.00,sydney
O4,C,2024-03-10 09:15:00,books,9.99,perth
O5,C,2024-03-10 09:20:00,garden,18.25,perth
O6,D,2024-03-15 22:05:00,toys,64.00,melbourne
O6,D,2024-03-15 22:05:00,toys,64.00,melbourne
O7,B,2024-03-29 07:55:00,electronics,330.10,melbourne
";

fn load_month() -> Vec<order_insights::data::OrderLine> {
    let workspace = TestWorkspace::new();
    let path = workspace.write("month.csv", MONTH_CSV);
    read_order_lines(&path, b',', UTF_8, &AliasMap::default(), 0)
        .expect("load month fixture")
        .lines
}

#[test]
fn daily_order_counts_sum_to_distinct_orders() {
    let lines = load_month();
    let points = aggregate::daily_trend(&lines);
    let counted: u64 = points.iter().map(|point| point.order_count).sum();
    assert_eq!(counted, aggregate::distinct_order_count(&lines));
    assert_eq!(counted, 7);
}

#[test]
fn daily_revenue_sums_to_total_revenue() {
    let lines = load_month();
    let points = aggregate::daily_trend(&lines);
    let daily_total = points
        .iter()
        .fold(Decimal::ZERO, |total, point| total + point.revenue);
    assert_eq!(daily_total, aggregate::total_revenue(&lines));
}

#[test]
fn trend_is_chronological_and_sparse() {
    let lines = load_month();
    let points = aggregate::daily_trend(&lines);
    assert!(points.windows(2).all(|pair| pair[0].date < pair[1].date));
    // 2024-03-02 through 2024-03-07 had no orders and must not appear.
    assert_eq!(points.len(), 5);
}

#[test]
fn categories_partition_the_filtered_revenue() {
    let lines = load_month();
    let ranked = aggregate::category_performance(&lines);
    let category_total = ranked
        .iter()
        .fold(Decimal::ZERO, |total, entry| total + entry.total_revenue);
    assert_eq!(category_total, aggregate::total_revenue(&lines));

    let from_rows: HashSet<&str> = lines.iter().map(|line| line.category.as_str()).collect();
    let from_ranked: HashSet<&str> = ranked.iter().map(|entry| entry.category.as_str()).collect();
    assert_eq!(from_rows, from_ranked);
    assert_eq!(ranked.iter().map(|entry| &entry.category).unique().count(), ranked.len());
}

#[test]
fn best_and_worst_cuts_are_views_of_one_ranking() {
    let lines = load_month();
    let ranked = aggregate::category_performance(&lines);
    let best = best_categories(&ranked, 2);
    let worst = worst_categories(&ranked, 2);
    assert_eq!(best[0].category, "electronics");
    assert_eq!(worst[0].category, "books");
    // With no revenue ties, worst(n) is the reversed tail of the ranking.
    let tail: Vec<_> = ranked.iter().rev().take(2).cloned().collect();
    assert_eq!(worst, tail);
}

#[test]
fn city_counts_are_distinct_customers_not_rows() {
    let lines = load_month();
    let distribution = aggregate::city_distribution(&lines);
    let melbourne = distribution
        .iter()
        .find(|entry| entry.city == "melbourne")
        .expect("melbourne present");
    // B and D; D's two-line order counts once.
    assert_eq!(melbourne.customer_count, 2);

    let ranked = top_cities(&distribution, 2);
    assert_eq!(ranked[0].city, "melbourne");
    // sydney and perth tie at one customer; sydney was seen first.
    assert_eq!(ranked[1].city, "sydney");
}

#[test]
fn rfm_pipeline_respects_the_date_filter() {
    let lines = load_month();
    let filtered = filter::select_range(&lines, Some("2024-03-01"), Some("2024-03-10")).unwrap();
    let reference = aggregate::reference_date(&filtered).expect("non-empty selection");
    // The reference is the max of the *filtered* set, not the whole dataset.
    assert_eq!(reference, "2024-03-10".parse().unwrap());

    let segments = aggregate::rfm_segmentation(&filtered, reference);
    assert_eq!(segments.len(), 3);
    let a = segments
        .iter()
        .find(|segment| segment.customer_id == "A")
        .expect("customer A");
    assert_eq!(a.frequency, 2);
    assert_eq!(a.monetary, "345.50".parse::<Decimal>().unwrap());
    assert_eq!(a.recency_days, 2);
    assert!(segments.iter().all(|segment| segment.recency_days >= 0));
}

#[test]
fn rfm_cuts_agree_with_the_segment_table() {
    let lines = load_month();
    let reference = aggregate::reference_date(&lines).unwrap();
    let segments = aggregate::rfm_segmentation(&lines, reference);

    let by_recency = best_by_recency(&segments, 1);
    assert_eq!(by_recency[0].customer_id, "B");
    assert_eq!(by_recency[0].recency_days, 0);

    let by_frequency = best_by_frequency(&segments, 2);
    assert_eq!(by_frequency[0].frequency, 2);

    let by_monetary = best_by_monetary(&segments, 1);
    assert_eq!(by_monetary[0].customer_id, "B");
}

#[test]
fn empty_selection_yields_empty_tables_everywhere() {
    let lines = load_month();
    let filtered = filter::select_range(&lines, Some("2024-04-01"), Some("2024-04-30")).unwrap();
    assert!(filtered.is_empty());
    assert!(aggregate::daily_trend(&filtered).is_empty());
    assert!(aggregate::category_performance(&filtered).is_empty());
    assert!(aggregate::city_distribution(&filtered).is_empty());
    assert_eq!(aggregate::reference_date(&filtered), None);
}
