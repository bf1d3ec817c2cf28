//! The aggregation core: pure functions from filtered order lines to the
//! derived summary tables.
//!
//! Each aggregator owns nothing and shares nothing: it reads a slice of
//! [`OrderLine`] rows and builds a fresh output table, so the four of them
//! can run in any order (or concurrently) over the same snapshot. Grouping
//! preserves first-seen key order and accumulation follows input order,
//! which keeps repeated runs bit-identical and makes tie-breaking
//! deterministic.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::data::OrderLine;

/// One calendar day with at least one order. Days without orders produce no
/// point; the trend is sparse, not zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTrendPoint {
    pub date: NaiveDate,
    pub order_count: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPerformance {
    pub category: String,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityDistribution {
    pub city: String,
    pub customer_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRfm {
    pub customer_id: String,
    pub last_purchase: NaiveDate,
    pub frequency: u64,
    pub monetary: Decimal,
    pub recency_days: i64,
}

/// Orders in the input, counted once each regardless of line count.
pub fn distinct_order_count(lines: &[OrderLine]) -> u64 {
    lines
        .iter()
        .map(|line| line.order_id.as_str())
        .unique()
        .count() as u64
}

pub fn total_revenue(lines: &[OrderLine]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |total, line| total + line.line_value)
}

/// Buckets rows by the calendar day of their purchase timestamp and emits
/// one point per day, ascending. `order_count` deduplicates order ids
/// within the day; `revenue` sums every line.
pub fn daily_trend(lines: &[OrderLine]) -> Vec<DailyTrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, (HashSet<&str>, Decimal)> = BTreeMap::new();
    for line in lines {
        let bucket = buckets.entry(line.purchased_at.date()).or_default();
        bucket.0.insert(line.order_id.as_str());
        bucket.1 += line.line_value;
    }
    buckets
        .into_iter()
        .map(|(date, (orders, revenue))| DailyTrendPoint {
            date,
            order_count: orders.len() as u64,
            revenue,
        })
        .collect()
}

/// Revenue per category, sorted descending. The sort is stable, so
/// categories with equal revenue keep the order they were first seen in.
pub fn category_performance(lines: &[OrderLine]) -> Vec<CategoryPerformance> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryPerformance> = Vec::new();
    for line in lines {
        if let Some(&slot) = slots.get(line.category.as_str()) {
            totals[slot].total_revenue += line.line_value;
        } else {
            slots.insert(line.category.as_str(), totals.len());
            totals.push(CategoryPerformance {
                category: line.category.clone(),
                total_revenue: line.line_value,
            });
        }
    }
    totals.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    totals
}

/// First `top` entries of the ranked sequence.
pub fn best_categories(ranked: &[CategoryPerformance], top: usize) -> Vec<CategoryPerformance> {
    ranked.iter().take(top).cloned().collect()
}

/// The same ranked sequence re-sorted ascending (stable both directions),
/// truncated to `top`. Deriving both cuts from one sequence keeps their
/// tie-breaking consistent.
pub fn worst_categories(ranked: &[CategoryPerformance], top: usize) -> Vec<CategoryPerformance> {
    let mut ascending = ranked.to_vec();
    ascending.sort_by(|a, b| a.total_revenue.cmp(&b.total_revenue));
    ascending.truncate(top);
    ascending
}

/// Distinct customers per city, in first-seen city order. Rows without a
/// city (cut-down variants) contribute nothing; callers skip this
/// aggregator entirely when the input has no city column.
pub fn city_distribution(lines: &[OrderLine]) -> Vec<CityDistribution> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut cities: Vec<(String, HashSet<&str>)> = Vec::new();
    for line in lines {
        let Some(city) = line.customer_city.as_deref() else {
            continue;
        };
        let slot = if let Some(&slot) = slots.get(city) {
            slot
        } else {
            slots.insert(city, cities.len());
            cities.push((city.to_string(), HashSet::new()));
            cities.len() - 1
        };
        cities[slot].1.insert(line.customer_id.as_str());
    }
    cities
        .into_iter()
        .map(|(city, customers)| CityDistribution {
            city,
            customer_count: customers.len() as u64,
        })
        .collect()
}

pub fn top_cities(distribution: &[CityDistribution], top: usize) -> Vec<CityDistribution> {
    let mut ranked = distribution.to_vec();
    ranked.sort_by(|a, b| b.customer_count.cmp(&a.customer_count));
    ranked.truncate(top);
    ranked
}

/// The recency reference: the latest purchase date across the whole
/// filtered input, not wall-clock "now". Computed once per run and shared
/// by every customer, which keeps historical analyses reproducible.
/// `None` on empty input; callers must short-circuit instead of segmenting.
pub fn reference_date(lines: &[OrderLine]) -> Option<NaiveDate> {
    lines.iter().map(|line| line.purchased_at.date()).max()
}

struct RfmAccumulator<'a> {
    customer_id: String,
    last_purchase: NaiveDateTime,
    orders: HashSet<&'a str>,
    monetary: Decimal,
}

/// One row per distinct customer: last purchase day, distinct-order
/// frequency, summed monetary value, and whole days since `reference_date`.
/// Recency is never negative because the reference is the maximum over the
/// same input.
pub fn rfm_segmentation(lines: &[OrderLine], reference_date: NaiveDate) -> Vec<CustomerRfm> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<RfmAccumulator<'_>> = Vec::new();
    for line in lines {
        if let Some(&slot) = slots.get(line.customer_id.as_str()) {
            let group = &mut groups[slot];
            group.last_purchase = group.last_purchase.max(line.purchased_at);
            group.orders.insert(line.order_id.as_str());
            group.monetary += line.line_value;
        } else {
            slots.insert(line.customer_id.as_str(), groups.len());
            groups.push(RfmAccumulator {
                customer_id: line.customer_id.clone(),
                last_purchase: line.purchased_at,
                orders: HashSet::from([line.order_id.as_str()]),
                monetary: line.line_value,
            });
        }
    }
    groups
        .into_iter()
        .map(|group| {
            let last_purchase = group.last_purchase.date();
            CustomerRfm {
                customer_id: group.customer_id,
                last_purchase,
                frequency: group.orders.len() as u64,
                monetary: group.monetary,
                recency_days: (reference_date - last_purchase).num_days(),
            }
        })
        .collect()
}

/// Customers with the smallest recency, ascending. Ties keep encounter order.
pub fn best_by_recency(segments: &[CustomerRfm], top: usize) -> Vec<CustomerRfm> {
    let mut ranked = segments.to_vec();
    ranked.sort_by(|a, b| a.recency_days.cmp(&b.recency_days));
    ranked.truncate(top);
    ranked
}

pub fn best_by_frequency(segments: &[CustomerRfm], top: usize) -> Vec<CustomerRfm> {
    let mut ranked = segments.to_vec();
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    ranked.truncate(top);
    ranked
}

pub fn best_by_monetary(segments: &[CustomerRfm], top: usize) -> Vec<CustomerRfm> {
    let mut ranked = segments.to_vec();
    ranked.sort_by(|a, b| b.monetary.cmp(&a.monetary));
    ranked.truncate(top);
    ranked
}
