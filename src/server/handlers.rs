//! HTTP route handlers
//!
//! Shared state and query parsing live here; the resource handlers are in
//! the submodules.

pub mod analytics;
pub mod entries;
pub mod jobs;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use super::config::{ConfigError, ServerConfig};
use crate::analytics::{period, AnalyticsError, DateRange, InvalidEntryPolicy, Period};
use crate::error::AppError;
use crate::models::WorkEntry;
use crate::storage::{Database, EntryFilter, StorageError};

/// Request-independent settings derived from [`ServerConfig`]
#[derive(Debug, Clone)]
pub struct Settings {
    pub offset: FixedOffset,
    pub invalid_entry_policy: InvalidEntryPolicy,
    pub api_token: Option<String>,
}

impl Settings {
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            offset: config.offset()?,
            invalid_entry_policy: config.invalid_entry_policy,
            api_token: config.api_token.clone(),
        })
    }

    /// Current time in the configured local offset
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Shared state
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub settings: Settings,
}

impl AppState {
    fn db(&self) -> Result<MutexGuard<'_, Database>, StorageError> {
        self.db.lock().map_err(|_| StorageError::LockError)
    }

    /// Runs `f` with the database locked; the lock is released on return
    pub fn with_db<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Database) -> Result<T, StorageError>,
    {
        let db = self.db()?;
        Ok(f(&db)?)
    }

    /// Loads a user's entries starting inside `range`
    pub fn entries_in(&self, user_id: &str, range: DateRange) -> Result<Vec<WorkEntry>, AppError> {
        self.with_db(|db| db.list_work_entries(user_id, &EntryFilter::in_range(range)))
    }
}

/// `period` / `startDate` / `endDate` query accepted by the analytics routes
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Time window selected by a [`WindowQuery`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Window {
    Named(Period),
    Explicit(DateRange),
}

impl WindowQuery {
    /// Resolves the window; both dates override `period`, one date alone is an error
    pub fn window(&self, offset: FixedOffset) -> Result<Window, AppError> {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (Some(start), Some(end)) => Ok(Window::Explicit(parse_range(start, end, offset)?)),
            (None, None) => Ok(Window::Named(self.granularity())),
            _ => Err(AppError::bad_request(
                "startDate and endDate must be given together",
            )),
        }
    }

    /// Bucket granularity for trend output
    pub fn granularity(&self) -> Period {
        Period::from_query(self.period.as_deref())
    }
}

impl Window {
    /// The window itself
    pub fn current(&self, now: DateTime<FixedOffset>) -> Result<DateRange, AnalyticsError> {
        match self {
            Window::Named(p) => period::resolve_range(*p, now),
            Window::Explicit(range) => Ok(*range),
        }
    }

    /// The window compared against in summaries
    pub fn previous(&self, now: DateTime<FixedOffset>) -> Result<DateRange, AnalyticsError> {
        match self {
            Window::Named(p) => period::previous_range(*p, now),
            Window::Explicit(range) => range.preceding(),
        }
    }
}

/// Parses two local dates into the window covering both days
pub fn parse_range(start: &str, end: &str, offset: FixedOffset) -> Result<DateRange, AppError> {
    let start = period::parse_date(start, offset)?;
    let end = period::parse_date(end, offset)?;
    Ok(DateRange::from_dates(start, end, offset)?)
}

/// GET /api/health
///
/// Liveness check, never requires a token
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "wagebook",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
