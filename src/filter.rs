//! Inclusive date-range selection over normalized order lines.
//!
//! Ranges work at calendar-day granularity: a row qualifies when the date
//! part of its purchase timestamp falls inside `[start, end]`, whatever the
//! time of day. Range validation happens here, before the aggregation core
//! ever sees the data.

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::data::{OrderLine, parse_naive_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("Invalid date range: start {start} is after end {end}");
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_naive_date(start)?, parse_naive_date(end)?)
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        self.start <= date && date <= self.end
    }
}

/// Earliest and latest purchase dates in the dataset, or `None` when it is
/// empty. These are the defaults for an unspecified range, mirroring the
/// full-span selection a user starts from.
pub fn dataset_bounds(lines: &[OrderLine]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = lines.iter().map(|line| line.purchased_at.date());
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(min, max), date| {
        (min.min(date), max.max(date))
    });
    Some((min, max))
}

pub fn by_date_range(lines: &[OrderLine], range: &DateRange) -> Vec<OrderLine> {
    lines
        .iter()
        .filter(|line| range.contains(line.purchased_at))
        .cloned()
        .collect()
}

/// Resolves the CLI range arguments against the dataset bounds and returns
/// the qualifying rows. An empty dataset short-circuits to an empty
/// selection without touching the range arguments.
pub fn select_range(
    lines: &[OrderLine],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<OrderLine>> {
    let Some((earliest, latest)) = dataset_bounds(lines) else {
        return Ok(Vec::new());
    };
    let start = match start {
        Some(raw) => parse_naive_date(raw)?,
        None => earliest,
    };
    let end = match end {
        Some(raw) => parse_naive_date(raw)?,
        None => latest,
    };
    let range = DateRange::new(start, end)?;
    let selected = by_date_range(lines, &range);
    debug!(
        "Selected {} of {} row(s) between {} and {}",
        selected.len(),
        lines.len(),
        range.start,
        range.end
    );
    Ok(selected)
}
