use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One retail sale. Rows are immutable after load; filtering only selects,
/// it never rewrites a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub region: String,
    pub product: String,
    pub sale_value: f64,
}

/// Filter criteria rebuilt on every dashboard request. Empty region/product
/// sets mean "no restriction"; the value range is inclusive on both ends.
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    pub regions: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub value_range: (f64, f64),
    pub date_ceiling: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Comma-separated region labels; absent or empty keeps every region.
    pub regions: Option<String>,
    /// Comma-separated product labels; absent or empty keeps every product.
    pub products: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub date_ceiling: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub regions: Vec<String>,
    pub products: Vec<String>,
    pub max_date: Option<NaiveDate>,
    pub row_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ValueBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub total_sales: f64,
    pub average_ticket: f64,
    pub order_count: usize,
}

#[derive(Debug, Serialize)]
pub struct GroupPoint {
    pub key: String,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct DatePoint {
    pub date: NaiveDate,
    pub total: f64,
}

/// Echo of the criteria that were actually applied, shown in the
/// "applied filters" panel on the page.
#[derive(Debug, Serialize)]
pub struct AppliedFilters {
    pub regions: Vec<String>,
    pub products: Vec<String>,
    pub min_value: f64,
    pub max_value: f64,
    pub date_ceiling: NaiveDate,
    pub row_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub applied: AppliedFilters,
    pub value_bounds: ValueBounds,
    pub metrics: MetricsResponse,
    pub by_region: Vec<GroupPoint>,
    pub by_product: Vec<GroupPoint>,
    pub by_date: Vec<DatePoint>,
}
