//! Analytics calculation logic
//!
//! Net hours and earnings of single entries, the trend convention, and the
//! aggregators that fold a list of entries into grouped totals.

use std::collections::BTreeMap;

use chrono::{Datelike, FixedOffset};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::models::WorkEntry;

use super::period::bucket_key;
use super::{AggregatePoint, AnalyticsError, InvalidEntryPolicy, Period, Stats, TrendResult};

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Weekday labels indexed by `num_days_from_sunday`
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Hours and earnings one finished entry adds to a group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub hours: f64,
    pub earnings: f64,
}

/// Running totals of one group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Totals {
    hours: f64,
    earnings: f64,
    entry_count: u32,
}

impl Totals {
    fn add(self, contribution: Contribution) -> Self {
        Self {
            hours: self.hours + contribution.hours,
            earnings: self.earnings + contribution.earnings,
            entry_count: self.entry_count + 1,
        }
    }

    fn into_point(self, bucket_key: String, label: Option<String>) -> AggregatePoint {
        AggregatePoint {
            bucket_key,
            label,
            hours: self.hours,
            earnings: self.earnings,
            entry_count: self.entry_count,
        }
    }

    fn into_stats(self) -> Stats {
        let (average_hours_per_entry, average_earnings_per_entry) = if self.entry_count > 0 {
            let count = f64::from(self.entry_count);
            (self.hours / count, self.earnings / count)
        } else {
            (0.0, 0.0)
        };

        Stats {
            total_hours: self.hours,
            total_earnings: self.earnings,
            total_entries: self.entry_count,
            average_hours_per_entry,
            average_earnings_per_entry,
        }
    }
}

/// Rounds to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calculates the net hours worked in an entry
///
/// `(end - start - break) / 1h`, computed in milliseconds.
///
/// # Errors
/// * `OpenEntry` if the entry has no end time
/// * `InvalidDuration` if the result is negative
pub fn net_hours(entry: &WorkEntry) -> Result<f64, AnalyticsError> {
    let end_time = entry
        .end_time
        .ok_or_else(|| AnalyticsError::OpenEntry(entry.id.clone()))?;

    let worked_ms = (end_time - entry.start_time).num_milliseconds()
        - i64::from(entry.break_duration_minutes) * MS_PER_MINUTE;
    let hours = worked_ms as f64 / MS_PER_HOUR;

    if hours < 0.0 {
        return Err(AnalyticsError::InvalidDuration {
            entry_id: Some(entry.id.clone()),
            hours,
        });
    }

    Ok(hours)
}

/// Calculates earnings for `hours` at `hourly_wage`, unrounded
///
/// # Errors
/// * `InvalidWage` if the wage is negative or NaN
/// * `InvalidDuration` if the hours are negative
pub fn earnings(hours: f64, hourly_wage: f64) -> Result<f64, AnalyticsError> {
    if hourly_wage.is_nan() || hourly_wage < 0.0 {
        return Err(AnalyticsError::InvalidWage {
            job_id: None,
            wage: hourly_wage,
        });
    }
    if hours < 0.0 {
        return Err(AnalyticsError::InvalidDuration {
            entry_id: None,
            hours,
        });
    }
    Ok(hours * hourly_wage)
}

/// Calculates the hours and earnings of a finished entry
pub fn contribution(entry: &WorkEntry) -> Result<Contribution, AnalyticsError> {
    let hours = net_hours(entry)?;
    let earnings = earnings(hours, entry.job.hourly_wage).map_err(|err| match err {
        AnalyticsError::InvalidWage { wage, .. } => AnalyticsError::InvalidWage {
            job_id: Some(entry.job.id.clone()),
            wage,
        },
        other => other,
    })?;

    Ok(Contribution { hours, earnings })
}

/// Calculates the earnings of a finished entry
pub fn entry_earnings(entry: &WorkEntry) -> Result<f64, AnalyticsError> {
    contribution(entry).map(|c| c.earnings)
}

/// Percent change from `previous` to `current`
///
/// Both zero gives 0; a zero previous value with a non-zero current value
/// gives 100. Otherwise the relative change in percent, rounded to 2 decimals.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current == 0.0 { 0.0 } else { 100.0 };
    }
    round2((current - previous) / previous * 100.0)
}

/// Builds a [`TrendResult`] for a named metric
pub fn trend(metric: &str, current: f64, previous: f64) -> TrendResult {
    TrendResult {
        metric: metric.to_string(),
        percent_change: percent_change(current, previous),
    }
}

/// Decides whether an entry takes part in an aggregation.
///
/// Running entries are left out silently. Invalid entries either fail the
/// aggregation or are left out with a warning, depending on `policy`.
fn admit(
    entry: &WorkEntry,
    policy: InvalidEntryPolicy,
) -> Result<Option<Contribution>, AnalyticsError> {
    if entry.is_running() {
        debug!(entry_id = %entry.id, "Leaving running work entry out of aggregation");
        return Ok(None);
    }

    match contribution(entry) {
        Ok(c) => Ok(Some(c)),
        Err(err) => match policy {
            InvalidEntryPolicy::Reject => Err(err),
            InvalidEntryPolicy::Skip => {
                warn!(entry_id = %entry.id, error = %err, "Excluding invalid work entry from aggregation");
                Ok(None)
            }
        },
    }
}

/// Folds the admitted entries into an accumulator
fn fold_entries<'a, A, I, F>(
    entries: I,
    policy: InvalidEntryPolicy,
    init: A,
    mut step: F,
) -> Result<A, AnalyticsError>
where
    I: IntoIterator<Item = &'a WorkEntry>,
    F: FnMut(A, &'a WorkEntry, Contribution) -> A,
{
    entries.into_iter().try_fold(init, |acc, entry| {
        Ok::<A, AnalyticsError>(match admit(entry, policy)? {
            Some(c) => step(acc, entry, c),
            None => acc,
        })
    })
}

/// Computes aggregate statistics over any iterator of entries
pub(crate) fn stats_from<'a, I>(entries: I, policy: InvalidEntryPolicy) -> Result<Stats, AnalyticsError>
where
    I: IntoIterator<Item = &'a WorkEntry>,
{
    fold_entries(entries, policy, Totals::default(), |totals, _, c| totals.add(c))
        .map(Totals::into_stats)
}

/// Computes aggregate statistics over a list of entries
///
/// # Arguments
/// * `entries` - Entries to aggregate; running entries are ignored
/// * `policy` - Handling of entries with invalid hours or wage
pub fn compute_stats(
    entries: &[WorkEntry],
    policy: InvalidEntryPolicy,
) -> Result<Stats, AnalyticsError> {
    stats_from(entries, policy)
}

/// Groups entries by job
///
/// Returns one point per distinct job id, in the order each job first appears
/// in `entries`. `bucket_key` is the job id and `label` the job name.
pub fn job_distribution(
    entries: &[WorkEntry],
    policy: InvalidEntryPolicy,
) -> Result<Vec<AggregatePoint>, AnalyticsError> {
    let groups = fold_entries(
        entries,
        policy,
        IndexMap::<&str, (&str, Totals)>::new(),
        |mut groups, entry, c| {
            let group = groups
                .entry(entry.job.id.as_str())
                .or_insert((entry.job.name.as_str(), Totals::default()));
            group.1 = group.1.add(c);
            groups
        },
    )?;

    Ok(groups
        .into_iter()
        .map(|(job_id, (name, totals))| totals.into_point(job_id.to_string(), Some(name.to_string())))
        .collect())
}

/// Groups entries by the local weekday of their start time
///
/// Always returns seven points, Sunday (`"0"`) through Saturday (`"6"`),
/// including days without entries.
pub fn weekly_pattern(
    entries: &[WorkEntry],
    offset: FixedOffset,
    policy: InvalidEntryPolicy,
) -> Result<Vec<AggregatePoint>, AnalyticsError> {
    let days = fold_entries(entries, policy, [Totals::default(); 7], |mut days, entry, c| {
        let weekday = entry
            .start_time
            .with_timezone(&offset)
            .weekday()
            .num_days_from_sunday() as usize;
        days[weekday] = days[weekday].add(c);
        days
    })?;

    Ok(days
        .iter()
        .zip(WEEKDAY_NAMES)
        .enumerate()
        .map(|(index, (totals, name))| totals.into_point(index.to_string(), Some(name.to_string())))
        .collect())
}

/// Groups entries into time buckets for the earnings trend chart
///
/// Bucket keys follow [`bucket_key`] for the period; the result is sorted
/// ascending by key.
pub fn earnings_trend(
    entries: &[WorkEntry],
    period: Period,
    offset: FixedOffset,
    policy: InvalidEntryPolicy,
) -> Result<Vec<AggregatePoint>, AnalyticsError> {
    let buckets = fold_entries(
        entries,
        policy,
        BTreeMap::<String, Totals>::new(),
        |mut buckets, entry, c| {
            let local = entry.start_time.with_timezone(&offset).naive_local();
            let totals = buckets.entry(bucket_key(period, local)).or_default();
            *totals = totals.add(c);
            buckets
        },
    )?;

    Ok(buckets
        .into_iter()
        .map(|(key, totals)| totals.into_point(key, None))
        .collect())
}
