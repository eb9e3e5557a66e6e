//! Work entry data models
//!
//! A work entry is one recorded shift: when it started, when it ended (absent
//! while the shift is still running), how long the break was, and which job it
//! was worked for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::job::Job;

/// Maximum accepted length of free-form entry notes
pub const MAX_NOTES_LEN: usize = 2000;

/// One recorded shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkEntry {
    /// Entry unique ID (UUID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Job snapshot the shift was worked for
    pub job: Job,
    /// Shift start
    pub start_time: DateTime<Utc>,
    /// Shift end, `None` while the shift is running
    pub end_time: Option<DateTime<Utc>>,
    /// Unpaid break in minutes
    pub break_duration_minutes: u32,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl WorkEntry {
    /// Whether the shift has not been ended yet
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Payload for creating a work entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkEntry {
    pub job_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub break_duration_minutes: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a work entry; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkEntryUpdate {
    pub job_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub break_duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

/// Checks the shift boundaries and break of an entry.
///
/// A running shift (no end time) only needs a sane break value; a finished
/// shift must end at or after its start and the break must fit inside it.
pub fn validate_shift(
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    break_duration_minutes: u32,
) -> Result<(), String> {
    let Some(end_time) = end_time else {
        return Ok(());
    };

    if end_time < start_time {
        return Err(format!(
            "end time {} is before start time {}",
            end_time.to_rfc3339(),
            start_time.to_rfc3339()
        ));
    }

    let shift_minutes = (end_time - start_time).num_minutes();
    if i64::from(break_duration_minutes) > shift_minutes {
        return Err(format!(
            "break of {} minutes is longer than the {} minute shift",
            break_duration_minutes, shift_minutes
        ));
    }

    Ok(())
}

/// Normalizes notes: trims, drops empty strings, enforces the length limit
pub fn normalize_notes(notes: Option<&str>) -> Result<Option<String>, String> {
    match notes.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > MAX_NOTES_LEN => Err(format!(
            "notes must be at most {} characters",
            MAX_NOTES_LEN
        )),
        Some(text) => Ok(Some(text.to_string())),
    }
}
