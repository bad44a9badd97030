use crate::engine;
use crate::errors::AppError;
use crate::models::{
    AppliedFilters, DashboardQuery, DashboardResponse, DatePoint, FilterCriteria, GroupPoint,
    MetaResponse, MetricsResponse, ValueBounds,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Query, State},
    response::Html,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(
        state.table.len(),
        engine::max_date(&state.table),
    ))
}

/// Control-population payload, fetched once at page load.
pub async fn get_meta(State(state): State<AppState>) -> Result<Json<MetaResponse>, AppError> {
    Ok(Json(MetaResponse {
        regions: engine::distinct_values(&state.table, |row| row.region.as_str()),
        products: engine::distinct_values(&state.table, |row| row.product.as_str()),
        max_date: engine::max_date(&state.table),
        row_count: state.table.len(),
    }))
}

/// One full recomputation pass: region view, slider bounds, conjunctive
/// filter, metrics, three aggregate views. Runs on every input change.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    for bound in [query.min_value, query.max_value].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(AppError::bad_request("value range bounds must be finite"));
        }
    }

    let regions = parse_selection(query.regions.as_deref());
    let products = parse_selection(query.products.as_deref());

    // Bounds come from the region view, not the full table, so the range
    // control tracks the selected regions.
    let region_view = engine::filter_by_regions(&state.table, &regions);
    let (bound_min, bound_max) = engine::value_bounds(&region_view);

    let criteria = FilterCriteria {
        regions,
        products,
        value_range: (
            query.min_value.unwrap_or(bound_min),
            query.max_value.unwrap_or(bound_max),
        ),
        date_ceiling: query
            .date_ceiling
            .or_else(|| engine::max_date(&state.table))
            .unwrap_or(NaiveDate::MAX),
    };

    let filtered = engine::apply_filters(&state.table, &criteria);
    let metrics = engine::compute_metrics(&filtered);

    let by_region = group_points(engine::aggregate_by(&filtered, |row| row.region.as_str()));
    let by_product = group_points(engine::aggregate_by(&filtered, |row| row.product.as_str()));
    let by_date = engine::aggregate_by_date(&filtered)
        .into_iter()
        .map(|(date, total)| DatePoint { date, total })
        .collect();

    Ok(Json(DashboardResponse {
        applied: AppliedFilters {
            regions: criteria.regions.iter().cloned().collect(),
            products: criteria.products.iter().cloned().collect(),
            min_value: criteria.value_range.0,
            max_value: criteria.value_range.1,
            date_ceiling: criteria.date_ceiling,
            row_count: metrics.count,
        },
        value_bounds: ValueBounds {
            min: bound_min,
            max: bound_max,
        },
        metrics: MetricsResponse {
            total_sales: metrics.total,
            average_ticket: metrics.average,
            order_count: metrics.count,
        },
        by_region,
        by_product,
        by_date,
    }))
}

fn parse_selection(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

fn group_points(groups: Vec<(String, f64)>) -> Vec<GroupPoint> {
    groups
        .into_iter()
        .map(|(key, total)| GroupPoint { key, total })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parsing_splits_and_trims() {
        let parsed = parse_selection(Some("North, South ,,East"));
        let labels: Vec<_> = parsed.iter().map(String::as_str).collect();
        assert_eq!(labels, vec!["East", "North", "South"]);
    }

    #[test]
    fn absent_or_blank_selection_means_no_restriction() {
        assert!(parse_selection(None).is_empty());
        assert!(parse_selection(Some("")).is_empty());
        assert!(parse_selection(Some(" , ")).is_empty());
    }
}
