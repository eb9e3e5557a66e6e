//! Analytics type definitions
//!
//! Contains the period / window types accepted by the aggregators and the
//! statistics structures they return.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::AnalyticsError;

/// Named reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Today so far
    Day,
    /// Last 7 days
    Week,
    /// Current calendar month so far (default)
    #[default]
    Month,
    /// Current calendar year so far
    Year,
}

impl Period {
    /// Returns the query-string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// Parses a `period` query parameter.
    ///
    /// Missing or unrecognized values fall back to [`Period::Month`].
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            None => Period::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                debug!("Unrecognized period {:?}, using month", raw);
                Period::default()
            }),
        }
    }
}

impl FromStr for Period {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(AnalyticsError::InvalidPeriod(s.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open time window `[start, end)`
///
/// An entry falls inside a window when its start time does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range, rejecting one that ends before it starts
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AnalyticsError> {
        if end < start {
            return Err(AnalyticsError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Whether `instant` lies inside the window
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Length of the window
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The equally long window ending where this one starts
    ///
    /// Fails when that window would start before the earliest representable
    /// instant.
    pub fn preceding(&self) -> Result<DateRange, AnalyticsError> {
        let start = self
            .start
            .checked_sub_signed(self.duration())
            .ok_or_else(|| AnalyticsError::InvalidRange {
                start: self.start.to_rfc3339(),
                end: self.end.to_rfc3339(),
            })?;
        Ok(DateRange {
            start,
            end: self.start,
        })
    }

    /// Smallest window covering both `self` and `other`
    pub fn hull(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// What to do with an entry whose hours or earnings are invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvalidEntryPolicy {
    /// Fail the whole aggregation with the entry's error (default)
    #[default]
    Reject,
    /// Leave the entry out and log a warning
    Skip,
}

/// One aggregated group: a time bucket, a job or a weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePoint {
    /// Bucket key (date key, job id or weekday index)
    pub bucket_key: String,

    /// Display label (job name, weekday name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Net hours worked
    pub hours: f64,

    /// Earnings
    pub earnings: f64,

    /// Number of entries in the group
    pub entry_count: u32,
}

/// Aggregate statistics over a set of entries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_hours: f64,
    pub total_earnings: f64,
    pub total_entries: u32,
    pub average_hours_per_entry: f64,
    pub average_earnings_per_entry: f64,
}

impl Stats {
    /// Copy with every value rounded to 2 decimals, for display
    pub fn rounded(&self) -> Stats {
        use super::calculator::round2;

        Stats {
            total_hours: round2(self.total_hours),
            total_earnings: round2(self.total_earnings),
            total_entries: self.total_entries,
            average_hours_per_entry: round2(self.average_hours_per_entry),
            average_earnings_per_entry: round2(self.average_earnings_per_entry),
        }
    }
}

/// Percent change of one metric between two windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub metric: String,
    pub percent_change: f64,
}

/// Current window statistics compared with the previous window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// Named period, absent for an explicit date range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    pub current_range: DateRange,

    pub previous_range: DateRange,

    pub current: Stats,

    pub previous: Stats,

    /// One entry per compared metric
    pub trend: Vec<TrendResult>,
}

/// Statistics for two arbitrary windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeComparison {
    pub current: Stats,
    pub previous: Stats,
}
