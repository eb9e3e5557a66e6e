//! Analytics error types

use thiserror::Error;

/// Errors raised while aggregating work entries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Net hours of an entry came out negative (break longer than the shift,
    /// or the shift ends before it starts)
    #[error("negative net duration of {hours:.2} hours{}", subject("work entry", .entry_id))]
    InvalidDuration {
        entry_id: Option<String>,
        hours: f64,
    },

    /// Hourly wage is negative or not a number
    #[error("invalid hourly wage {wage}{}", subject("job", .job_id))]
    InvalidWage { job_id: Option<String>, wage: f64 },

    /// Entry has no end time yet, so it has no duration
    #[error("work entry {0} is still running")]
    OpenEntry(String),

    /// Date range ends before it starts
    #[error("invalid date range: {end} is before {start}")]
    InvalidRange { start: String, end: String },

    /// Date string could not be parsed
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Unknown period name (strict parsing only)
    #[error("unknown period: {0}")]
    InvalidPeriod(String),
}

fn subject(kind: &str, id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" for {} {}", kind, id),
        None => String::new(),
    }
}

impl AnalyticsError {
    /// Whether the error describes bad data in an entry or job (as opposed to
    /// a bad request parameter)
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDuration { .. } | Self::InvalidWage { .. } | Self::OpenEntry(_)
        )
    }
}
