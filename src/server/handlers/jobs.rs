//! Job routes

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::AppState;
use crate::error::AppError;
use crate::models::{Job, JobUpdate, NewJob};

/// GET /api/users/{user_id}/jobs
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = state.with_db(|db| db.list_jobs(&user_id))?;
    Ok(Json(jobs))
}

/// POST /api/users/{user_id}/jobs
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<NewJob>, JsonRejection>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let Json(new_job) = payload?;
    let job = state.with_db(|db| db.create_job(&user_id, &new_job))?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/users/{user_id}/jobs/{job_id}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path((user_id, job_id)): Path<(String, String)>,
) -> Result<Json<Job>, AppError> {
    let job = state.with_db(|db| db.get_job(&user_id, &job_id))?;
    Ok(Json(job))
}

/// PUT /api/users/{user_id}/jobs/{job_id}
pub async fn update_job(
    State(state): State<Arc<AppState>>,
    Path((user_id, job_id)): Path<(String, String)>,
    payload: Result<Json<JobUpdate>, JsonRejection>,
) -> Result<Json<Job>, AppError> {
    let Json(update) = payload?;
    let job = state.with_db(|db| db.update_job(&user_id, &job_id, &update))?;
    Ok(Json(job))
}

/// DELETE /api/users/{user_id}/jobs/{job_id}
///
/// Removes the job's work entries as well
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path((user_id, job_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.with_db(|db| db.delete_job(&user_id, &job_id))?;
    Ok(StatusCode::NO_CONTENT)
}
