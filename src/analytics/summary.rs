//! Summary and comparison composition
//!
//! Thin layer over the calculator: filters entries into windows and compares
//! the resulting statistics.

use chrono::{DateTime, FixedOffset};

use crate::models::WorkEntry;

use super::calculator::{stats_from, trend};
use super::period::{previous_range, resolve_range};
use super::{
    AnalyticsError, DateRange, InvalidEntryPolicy, Period, PeriodSummary, RangeComparison, Stats,
    TrendResult,
};

/// Metric names reported in [`PeriodSummary::trend`]
pub const TREND_METRICS: [&str; 5] = [
    "totalHours",
    "totalEarnings",
    "totalEntries",
    "averageHoursPerEntry",
    "averageEarningsPerEntry",
];

/// Computes statistics over the entries starting inside `range`
pub fn stats_in_range(
    entries: &[WorkEntry],
    range: &DateRange,
    policy: InvalidEntryPolicy,
) -> Result<Stats, AnalyticsError> {
    stats_from(
        entries.iter().filter(|entry| range.contains(entry.start_time)),
        policy,
    )
}

fn trends(current: &Stats, previous: &Stats) -> Vec<TrendResult> {
    let values = [
        (current.total_hours, previous.total_hours),
        (current.total_earnings, previous.total_earnings),
        (
            f64::from(current.total_entries),
            f64::from(previous.total_entries),
        ),
        (
            current.average_hours_per_entry,
            previous.average_hours_per_entry,
        ),
        (
            current.average_earnings_per_entry,
            previous.average_earnings_per_entry,
        ),
    ];

    TREND_METRICS
        .iter()
        .zip(values)
        .map(|(metric, (current, previous))| trend(metric, current, previous))
        .collect()
}

fn summarize(
    period: Option<Period>,
    entries: &[WorkEntry],
    current_range: DateRange,
    previous_range: DateRange,
    policy: InvalidEntryPolicy,
) -> Result<PeriodSummary, AnalyticsError> {
    let current = stats_in_range(entries, &current_range, policy)?;
    let previous = stats_in_range(entries, &previous_range, policy)?;

    Ok(PeriodSummary {
        period,
        current_range,
        previous_range,
        trend: trends(&current, &previous),
        current,
        previous,
    })
}

/// Summarizes a named period against its previous window
///
/// # Arguments
/// * `entries` - Entries covering at least both windows; others are ignored
/// * `period` - Named period
/// * `now` - Current local time, its offset defines local calendar days
/// * `policy` - Handling of entries with invalid hours or wage
pub fn period_summary(
    entries: &[WorkEntry],
    period: Period,
    now: DateTime<FixedOffset>,
    policy: InvalidEntryPolicy,
) -> Result<PeriodSummary, AnalyticsError> {
    summarize(
        Some(period),
        entries,
        resolve_range(period, now)?,
        previous_range(period, now)?,
        policy,
    )
}

/// Summarizes an explicit window against the equally long window before it
pub fn range_summary(
    entries: &[WorkEntry],
    range: DateRange,
    policy: InvalidEntryPolicy,
) -> Result<PeriodSummary, AnalyticsError> {
    summarize(None, entries, range, range.preceding()?, policy)
}

/// Computes statistics for two arbitrary windows
pub fn compare_ranges(
    entries: &[WorkEntry],
    current: &DateRange,
    previous: &DateRange,
    policy: InvalidEntryPolicy,
) -> Result<RangeComparison, AnalyticsError> {
    Ok(RangeComparison {
        current: stats_in_range(entries, current, policy)?,
        previous: stats_in_range(entries, previous, policy)?,
    })
}
