//! Repository layer for database CRUD operations
//!
//! Jobs and work entries, each as an `impl Database` block.

mod job;
mod work_entry;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;

pub use super::error::StorageError;
use crate::analytics::DateRange;

/// Selection applied when listing work entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    /// Only entries whose start time falls inside this window
    pub range: Option<DateRange>,
    /// Only entries worked for this job
    pub job_id: Option<String>,
}

impl EntryFilter {
    /// Filter selecting entries that start inside `range`
    pub fn in_range(range: DateRange) -> Self {
        Self {
            range: Some(range),
            job_id: None,
        }
    }
}

/// Fixed-width UTC form, so string order in SQL is chronological
pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}
