//! Work entry routes

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SubsecRound, Utc};
use serde::Deserialize;

use super::{parse_range, AppState};
use crate::error::AppError;
use crate::models::{NewWorkEntry, WorkEntry, WorkEntryUpdate};
use crate::storage::EntryFilter;

/// Query of the entry list route
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub job_id: Option<String>,
}

/// GET /api/users/{user_id}/entries
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: Result<Query<EntryListQuery>, QueryRejection>,
) -> Result<Json<Vec<WorkEntry>>, AppError> {
    let Query(query) = query?;

    let range = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => Some(parse_range(start, end, state.settings.offset)?),
        (None, None) => None,
        _ => {
            return Err(AppError::bad_request(
                "startDate and endDate must be given together",
            ))
        }
    };
    let filter = EntryFilter {
        range,
        job_id: query.job_id,
    };

    let entries = state.with_db(|db| db.list_work_entries(&user_id, &filter))?;
    Ok(Json(entries))
}

/// POST /api/users/{user_id}/entries
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<NewWorkEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkEntry>), AppError> {
    let Json(new_entry) = payload?;
    let entry = state.with_db(|db| db.create_work_entry(&user_id, &new_entry))?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/users/{user_id}/entries/{entry_id}
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path((user_id, entry_id)): Path<(String, String)>,
) -> Result<Json<WorkEntry>, AppError> {
    let entry = state.with_db(|db| db.get_work_entry(&user_id, &entry_id))?;
    Ok(Json(entry))
}

/// PUT /api/users/{user_id}/entries/{entry_id}
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Path((user_id, entry_id)): Path<(String, String)>,
    payload: Result<Json<WorkEntryUpdate>, JsonRejection>,
) -> Result<Json<WorkEntry>, AppError> {
    let Json(update) = payload?;
    let entry = state.with_db(|db| db.update_work_entry(&user_id, &entry_id, &update))?;
    Ok(Json(entry))
}

/// POST /api/users/{user_id}/entries/{entry_id}/stop
///
/// Ends a running shift at the current time
pub async fn stop_entry(
    State(state): State<Arc<AppState>>,
    Path((user_id, entry_id)): Path<(String, String)>,
) -> Result<Json<WorkEntry>, AppError> {
    let now = Utc::now().trunc_subsecs(3);
    let entry = state.with_db(|db| db.stop_work_entry(&user_id, &entry_id, now))?;
    Ok(Json(entry))
}

/// DELETE /api/users/{user_id}/entries/{entry_id}
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path((user_id, entry_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.with_db(|db| db.delete_work_entry(&user_id, &entry_id))?;
    Ok(StatusCode::NO_CONTENT)
}
