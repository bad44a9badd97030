use crate::models::{FilterCriteria, Transaction};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Summary metrics over a filtered table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    pub total: f64,
    pub average: f64,
    pub count: usize,
}

/// Keeps a row iff every criterion holds: region membership (empty set
/// keeps all), sale value inside the inclusive range, date at or below the
/// ceiling, product membership (empty set keeps all). Row order is
/// preserved and an empty result is valid.
pub fn apply_filters(table: &[Transaction], criteria: &FilterCriteria) -> Vec<Transaction> {
    let (min_value, max_value) = criteria.value_range;
    table
        .iter()
        .filter(|row| criteria.regions.is_empty() || criteria.regions.contains(&row.region))
        .filter(|row| row.sale_value >= min_value && row.sale_value <= max_value)
        .filter(|row| row.date <= criteria.date_ceiling)
        .filter(|row| criteria.products.is_empty() || criteria.products.contains(&row.product))
        .cloned()
        .collect()
}

/// Region-only view of the table. The slider bounds must come from this
/// view rather than the full table, so bounds track the selected regions.
pub fn filter_by_regions(table: &[Transaction], regions: &BTreeSet<String>) -> Vec<Transaction> {
    table
        .iter()
        .filter(|row| regions.is_empty() || regions.contains(&row.region))
        .cloned()
        .collect()
}

/// Min and max sale value of a region-filtered table. When all values are
/// equal the max is nudged to `min + 1` so a range control always has a
/// positive span; an empty table yields `(0, 1)` for the same reason. Both
/// are policy choices, not derived facts.
pub fn value_bounds(table: &[Transaction]) -> (f64, f64) {
    let mut values = table.iter().map(|row| row.sale_value);
    let Some(first) = values.next() else {
        return (0.0, 1.0);
    };
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if max > min { (min, max) } else { (min, min + 1.0) }
}

/// Total, mean, and row count. The mean of an empty table is defined as 0
/// rather than NaN; callers rely on that guard.
pub fn compute_metrics(table: &[Transaction]) -> Metrics {
    let count = table.len();
    let total: f64 = table.iter().map(|row| row.sale_value).sum();
    let average = if count == 0 { 0.0 } else { total / count as f64 };
    Metrics {
        total,
        average,
        count,
    }
}

/// Groups rows by the label `key` extracts (region or product) and sums
/// sale values per group. Output is in ascending key order regardless of
/// input row order.
pub fn aggregate_by<'a, F>(table: &'a [Transaction], key: F) -> Vec<(String, f64)>
where
    F: Fn(&'a Transaction) -> &'a str,
{
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for row in table {
        *groups.entry(key(row)).or_insert(0.0) += row.sale_value;
    }
    groups
        .into_iter()
        .map(|(label, total)| (label.to_string(), total))
        .collect()
}

/// Per-date sale totals in ascending date order. Dates with no rows are
/// not synthesized.
pub fn aggregate_by_date(table: &[Transaction]) -> Vec<(NaiveDate, f64)> {
    let mut groups: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in table {
        *groups.entry(row.date).or_insert(0.0) += row.sale_value;
    }
    groups.into_iter().collect()
}

/// Latest sale date in the table, used as the default date ceiling.
pub fn max_date(table: &[Transaction]) -> Option<NaiveDate> {
    table.iter().map(|row| row.date).max()
}

/// Sorted distinct labels for populating a multi-select control.
pub fn distinct_values<'a, F>(table: &'a [Transaction], key: F) -> Vec<String>
where
    F: Fn(&'a Transaction) -> &'a str,
{
    let labels: BTreeSet<&str> = table.iter().map(key).collect();
    labels.into_iter().map(str::to_string).collect()
}
