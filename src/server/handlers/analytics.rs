//! Analytics routes
//!
//! Each handler loads the entries of the window it needs, releases the
//! database, and then aggregates.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use super::{parse_range, AppState, Window, WindowQuery};
use crate::analytics::{
    calculator, summary, AggregatePoint, PeriodSummary, RangeComparison,
};
use crate::error::AppError;

/// Query of the compare route; all four dates are required
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareQuery {
    pub current_start: Option<String>,
    pub current_end: Option<String>,
    pub previous_start: Option<String>,
    pub previous_end: Option<String>,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .ok_or_else(|| AppError::bad_request(format!("missing query parameter {}", name)))
}

/// GET /api/users/{user_id}/analytics/summary
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<PeriodSummary>, AppError> {
    let Query(query) = query?;
    let settings = &state.settings;
    let now = settings.now();
    let window = query.window(settings.offset)?;

    let current = window.current(now)?;
    let previous = window.previous(now)?;
    let entries = state.entries_in(&user_id, current.hull(&previous))?;
    debug!(user_id = %user_id, ?window, entries = entries.len(), "Computing summary");

    let result = match window {
        Window::Named(period) => {
            summary::period_summary(&entries, period, now, settings.invalid_entry_policy)?
        }
        Window::Explicit(range) => {
            summary::range_summary(&entries, range, settings.invalid_entry_policy)?
        }
    };
    Ok(Json(result))
}

/// GET /api/users/{user_id}/analytics/earnings-trend
///
/// `period` also picks the bucket granularity for explicit ranges
pub async fn earnings_trend(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<Vec<AggregatePoint>>, AppError> {
    let Query(query) = query?;
    let settings = &state.settings;
    let range = query.window(settings.offset)?.current(settings.now())?;

    let entries = state.entries_in(&user_id, range)?;
    let points = calculator::earnings_trend(
        &entries,
        query.granularity(),
        settings.offset,
        settings.invalid_entry_policy,
    )?;
    Ok(Json(points))
}

/// GET /api/users/{user_id}/analytics/job-distribution
pub async fn job_distribution(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<Vec<AggregatePoint>>, AppError> {
    let Query(query) = query?;
    let settings = &state.settings;
    let range = query.window(settings.offset)?.current(settings.now())?;

    let entries = state.entries_in(&user_id, range)?;
    let points = calculator::job_distribution(&entries, settings.invalid_entry_policy)?;
    Ok(Json(points))
}

/// GET /api/users/{user_id}/analytics/weekly-pattern
pub async fn weekly_pattern(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<Vec<AggregatePoint>>, AppError> {
    let Query(query) = query?;
    let settings = &state.settings;
    let range = query.window(settings.offset)?.current(settings.now())?;

    let entries = state.entries_in(&user_id, range)?;
    let points =
        calculator::weekly_pattern(&entries, settings.offset, settings.invalid_entry_policy)?;
    Ok(Json(points))
}

/// GET /api/users/{user_id}/analytics/compare
pub async fn compare(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: Result<Query<CompareQuery>, QueryRejection>,
) -> Result<Json<RangeComparison>, AppError> {
    let Query(query) = query?;
    let settings = &state.settings;

    let current = parse_range(
        required(&query.current_start, "currentStart")?,
        required(&query.current_end, "currentEnd")?,
        settings.offset,
    )?;
    let previous = parse_range(
        required(&query.previous_start, "previousStart")?,
        required(&query.previous_end, "previousEnd")?,
        settings.offset,
    )?;

    let entries = state.entries_in(&user_id, current.hull(&previous))?;
    let comparison =
        summary::compare_ranges(&entries, &current, &previous, settings.invalid_entry_policy)?;
    Ok(Json(comparison))
}
