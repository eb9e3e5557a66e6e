//! Period bucketing and window resolution
//!
//! Local calendar arithmetic is done against a fixed UTC offset carried by
//! `now` (or passed explicitly), so results do not depend on the host clock's
//! time zone.

use std::ops::RangeInclusive;

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc,
};

use super::{AnalyticsError, DateRange, Period};

/// Calendar years accepted from request parameters
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

/// Bucket key format for day, week and month trends
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Bucket key format for year trends
pub const MONTH_KEY_FORMAT: &str = "%Y-%m";

/// Returns the trend bucket key of a local timestamp
///
/// Day, week and month trends all bucket per calendar day; year trends
/// bucket per calendar month.
pub fn bucket_key(period: Period, local: NaiveDateTime) -> String {
    match period {
        Period::Year => local.format(MONTH_KEY_FORMAT).to_string(),
        Period::Day | Period::Week | Period::Month => local.format(DAY_KEY_FORMAT).to_string(),
    }
}

/// UTC instant of local midnight at the start of `date`
pub fn local_midnight(
    date: NaiveDate,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, AnalyticsError> {
    date.and_time(NaiveTime::MIN)
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .map(|utc| utc.and_utc())
        .ok_or_else(|| AnalyticsError::InvalidDate(date.to_string()))
}

fn first_day_of_month(date: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    date.with_day0(0)
        .ok_or_else(|| AnalyticsError::InvalidDate(date.to_string()))
}

fn first_day_of_year(date: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    date.with_ordinal0(0)
        .ok_or_else(|| AnalyticsError::InvalidDate(date.to_string()))
}

fn day_before(date: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    date.pred_opt()
        .ok_or_else(|| AnalyticsError::InvalidDate(date.to_string()))
}

fn days_before(instant: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, AnalyticsError> {
    instant
        .checked_sub_signed(Duration::days(days))
        .ok_or_else(|| AnalyticsError::InvalidDate(instant.to_rfc3339()))
}

/// Resolves the current window of a period, ending at `now`
///
/// * day: local midnight today
/// * week: 7 days before `now`
/// * month: local midnight on the first of the month
/// * year: local midnight on January 1st
pub fn resolve_range(
    period: Period,
    now: DateTime<FixedOffset>,
) -> Result<DateRange, AnalyticsError> {
    let offset = *now.offset();
    let today = now.date_naive();
    let end = now.with_timezone(&Utc);

    let start = match period {
        Period::Day => local_midnight(today, offset)?,
        Period::Week => days_before(end, 7)?,
        Period::Month => local_midnight(first_day_of_month(today)?, offset)?,
        Period::Year => local_midnight(first_day_of_year(today)?, offset)?,
    };

    Ok(DateRange { start, end })
}

/// Resolves the window a period's current window is compared against
///
/// * day: the whole previous calendar day
/// * week: the 7 days before the current 7-day window
/// * month: the whole previous calendar month
/// * year: the whole previous calendar year
pub fn previous_range(
    period: Period,
    now: DateTime<FixedOffset>,
) -> Result<DateRange, AnalyticsError> {
    let offset = *now.offset();
    let today = now.date_naive();
    let end = now.with_timezone(&Utc);

    let (start_date, end_date) = match period {
        Period::Day => (day_before(today)?, today),
        Period::Week => {
            return Ok(DateRange {
                start: days_before(end, 14)?,
                end: days_before(end, 7)?,
            })
        }
        Period::Month => {
            let this_month = first_day_of_month(today)?;
            (first_day_of_month(day_before(this_month)?)?, this_month)
        }
        Period::Year => {
            let this_year = first_day_of_year(today)?;
            (first_day_of_year(day_before(this_year)?)?, this_year)
        }
    };

    Ok(DateRange {
        start: local_midnight(start_date, offset)?,
        end: local_midnight(end_date, offset)?,
    })
}

impl DateRange {
    /// Window covering the local calendar days `start_date..=end_date`
    pub fn from_dates(
        start_date: NaiveDate,
        end_date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<Self, AnalyticsError> {
        let reversed = || AnalyticsError::InvalidRange {
            start: start_date.to_string(),
            end: end_date.to_string(),
        };
        if end_date < start_date {
            return Err(reversed());
        }

        let day_after_end = end_date.checked_add_days(Days::new(1)).ok_or_else(reversed)?;
        Ok(DateRange {
            start: local_midnight(start_date, offset)?,
            end: local_midnight(day_after_end, offset)?,
        })
    }
}

/// Parses an ISO 8601 date (`YYYY-MM-DD`) or an RFC 3339 timestamp
///
/// Timestamps are reduced to their local calendar date.
pub fn parse_date(value: &str, offset: FixedOffset) -> Result<NaiveDate, AnalyticsError> {
    let value = value.trim();

    let date = NaiveDate::parse_from_str(value, DAY_KEY_FORMAT)
        .or_else(|_| {
            DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&offset).date_naive())
        })
        .map_err(|_| AnalyticsError::InvalidDate(value.to_string()))?;

    // Four-digit years keep stored RFC 3339 text in chronological order
    if !SUPPORTED_YEARS.contains(&date.year()) {
        return Err(AnalyticsError::InvalidDate(value.to_string()));
    }
    Ok(date)
}
