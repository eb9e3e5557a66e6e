//! Unit tests for analytics calculator
//!
//! Tests for net hours, earnings, trend percentages and the distribution,
//! weekly and time-bucket aggregators.

use super::calculator::*;
use super::*;
use crate::models::{Job, WorkEntry};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use proptest::prelude::*;

// ===== Helper Functions =====

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

fn create_job(id: &str, name: &str, hourly_wage: f64) -> Job {
    Job {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        name: name.to_string(),
        hourly_wage,
        created_at: utc(2023, 12, 1, 0, 0),
    }
}

fn create_entry(
    id: &str,
    job: &Job,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    break_duration_minutes: u32,
) -> WorkEntry {
    WorkEntry {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        job: job.clone(),
        start_time,
        end_time,
        break_duration_minutes,
        notes: None,
        created_at: start_time,
    }
}

fn utc_offset() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

// ===== net_hours Tests =====

#[test]
fn test_net_hours_subtracts_break() {
    let job = create_job("job-a", "Cafe", 20.0);
    let entry = create_entry("e1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 17, 0)), 60);

    assert_eq!(net_hours(&entry).unwrap(), 7.0);
}

#[test]
fn test_net_hours_without_break_is_shift_length() {
    let job = create_job("job-a", "Cafe", 20.0);
    let entry = create_entry("e1", &job, utc(2024, 1, 1, 9, 15), Some(utc(2024, 1, 1, 11, 45)), 0);

    assert_eq!(net_hours(&entry).unwrap(), 2.5);
}

#[test]
fn test_net_hours_rejects_end_before_start() {
    let job = create_job("job-a", "Cafe", 20.0);
    let entry = create_entry("e1", &job, utc(2024, 1, 1, 17, 0), Some(utc(2024, 1, 1, 9, 0)), 0);

    match net_hours(&entry) {
        Err(AnalyticsError::InvalidDuration { entry_id, hours }) => {
            assert_eq!(entry_id.as_deref(), Some("e1"));
            assert_eq!(hours, -8.0);
        }
        other => panic!("expected InvalidDuration, got {:?}", other),
    }
}

#[test]
fn test_net_hours_rejects_break_longer_than_shift() {
    let job = create_job("job-a", "Cafe", 20.0);
    let entry = create_entry("e1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 10, 0)), 90);

    assert!(matches!(
        net_hours(&entry),
        Err(AnalyticsError::InvalidDuration { .. })
    ));
}

#[test]
fn test_net_hours_break_equal_to_shift_is_zero() {
    let job = create_job("job-a", "Cafe", 20.0);
    let entry = create_entry("e1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 10, 0)), 60);

    assert_eq!(net_hours(&entry).unwrap(), 0.0);
}

#[test]
fn test_net_hours_running_entry() {
    let job = create_job("job-a", "Cafe", 20.0);
    let entry = create_entry("e1", &job, utc(2024, 1, 1, 9, 0), None, 0);

    assert_eq!(
        net_hours(&entry),
        Err(AnalyticsError::OpenEntry("e1".to_string()))
    );
}

// ===== earnings Tests =====

#[test]
fn test_earnings_is_hours_times_wage() {
    assert_eq!(earnings(7.0, 25.0).unwrap(), 175.0);
    assert_eq!(earnings(0.0, 25.0).unwrap(), 0.0);
    assert_eq!(earnings(3.0, 0.0).unwrap(), 0.0);
}

#[test]
fn test_earnings_rejects_negative_wage() {
    assert!(matches!(
        earnings(2.0, -1.0),
        Err(AnalyticsError::InvalidWage { job_id: None, .. })
    ));
}

#[test]
fn test_entry_earnings_reports_job() {
    let job = create_job("job-neg", "Broken", -10.0);
    let entry = create_entry("e1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 10, 0)), 0);

    match entry_earnings(&entry) {
        Err(AnalyticsError::InvalidWage { job_id, wage }) => {
            assert_eq!(job_id.as_deref(), Some("job-neg"));
            assert_eq!(wage, -10.0);
        }
        other => panic!("expected InvalidWage, got {:?}", other),
    }
}

#[test]
fn test_entry_earnings() {
    let job = create_job("job-a", "Cafe", 25.0);
    let entry = create_entry("e1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 17, 0)), 60);

    assert_eq!(entry_earnings(&entry).unwrap(), 175.0);
}

// ===== percent_change Tests =====

#[test]
fn test_percent_change_zero_over_zero() {
    assert_eq!(percent_change(0.0, 0.0), 0.0);
}

#[test]
fn test_percent_change_from_zero() {
    assert_eq!(percent_change(50.0, 0.0), 100.0);
    assert_eq!(percent_change(0.01, 0.0), 100.0);
}

#[test]
fn test_percent_change_increase_and_decrease() {
    assert_eq!(percent_change(150.0, 100.0), 50.0);
    assert_eq!(percent_change(50.0, 100.0), -50.0);
    assert_eq!(percent_change(0.0, 100.0), -100.0);
}

#[test]
fn test_percent_change_rounds_to_two_decimals() {
    assert_eq!(percent_change(2.0, 3.0), -33.33);
    assert_eq!(percent_change(4.0, 3.0), 33.33);
}

#[test]
fn test_trend_carries_metric_name() {
    let result = trend("totalHours", 150.0, 100.0);
    assert_eq!(result.metric, "totalHours");
    assert_eq!(result.percent_change, 50.0);
}

// ===== compute_stats Tests =====

#[test]
fn test_compute_stats_empty() {
    let stats = compute_stats(&[], InvalidEntryPolicy::Reject).unwrap();
    assert_eq!(stats, Stats::default());
}

#[test]
fn test_compute_stats_totals_and_averages() {
    let job = create_job("job-a", "Cafe", 20.0);
    let entries = vec![
        create_entry("e1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 17, 0)), 30),
        create_entry("e2", &job, utc(2024, 1, 2, 9, 0), Some(utc(2024, 1, 2, 13, 0)), 0),
    ];

    let stats = compute_stats(&entries, InvalidEntryPolicy::Reject).unwrap();
    assert_eq!(stats.total_hours, 11.5);
    assert_eq!(stats.total_earnings, 230.0);
    assert_eq!(stats.total_entries, 2);
    assert_eq!(stats.average_hours_per_entry, 5.75);
    assert_eq!(stats.average_earnings_per_entry, 115.0);
}

#[test]
fn test_compute_stats_ignores_running_entries() {
    let job = create_job("job-a", "Cafe", 20.0);
    let entries = vec![
        create_entry("e1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 10, 0)), 0),
        create_entry("e2", &job, utc(2024, 1, 2, 9, 0), None, 0),
    ];

    let stats = compute_stats(&entries, InvalidEntryPolicy::Reject).unwrap();
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.total_hours, 1.0);
}

#[test]
fn test_compute_stats_reject_policy_fails_batch() {
    let job = create_job("job-a", "Cafe", 20.0);
    let entries = vec![
        create_entry("good", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 10, 0)), 0),
        create_entry("bad", &job, utc(2024, 1, 2, 17, 0), Some(utc(2024, 1, 2, 9, 0)), 0),
    ];

    let err = compute_stats(&entries, InvalidEntryPolicy::Reject).unwrap_err();
    assert!(matches!(
        err,
        AnalyticsError::InvalidDuration { entry_id: Some(ref id), .. } if id == "bad"
    ));
}

#[test]
fn test_compute_stats_skip_policy_excludes_invalid() {
    let job = create_job("job-a", "Cafe", 20.0);
    let broken_job = create_job("job-b", "Broken", -5.0);
    let entries = vec![
        create_entry("good", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 10, 0)), 0),
        create_entry("bad-duration", &job, utc(2024, 1, 2, 17, 0), Some(utc(2024, 1, 2, 9, 0)), 0),
        create_entry("bad-wage", &broken_job, utc(2024, 1, 3, 9, 0), Some(utc(2024, 1, 3, 10, 0)), 0),
    ];

    let stats = compute_stats(&entries, InvalidEntryPolicy::Skip).unwrap();
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.total_hours, 1.0);
    assert_eq!(stats.total_earnings, 20.0);
}

// ===== job_distribution Tests =====

#[test]
fn test_job_distribution_scenario() {
    let job_a = create_job("job-a", "Cafe", 20.0);
    let entries = vec![
        create_entry("e1", &job_a, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 17, 0)), 30),
        create_entry("e2", &job_a, utc(2024, 1, 2, 9, 0), Some(utc(2024, 1, 2, 13, 0)), 0),
    ];

    let distribution = job_distribution(&entries, InvalidEntryPolicy::Reject).unwrap();
    assert_eq!(distribution.len(), 1);
    assert_eq!(distribution[0].bucket_key, "job-a");
    assert_eq!(distribution[0].label.as_deref(), Some("Cafe"));
    assert_eq!(distribution[0].hours, 11.5);
    assert_eq!(distribution[0].earnings, 230.0);
    assert_eq!(distribution[0].entry_count, 2);
}

#[test]
fn test_job_distribution_keeps_first_seen_order() {
    let zeta = create_job("job-z", "Zeta", 10.0);
    let alpha = create_job("job-a", "Alpha", 30.0);
    let entries = vec![
        create_entry("e1", &zeta, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 10, 0)), 0),
        create_entry("e2", &alpha, utc(2024, 1, 1, 11, 0), Some(utc(2024, 1, 1, 15, 0)), 0),
        create_entry("e3", &zeta, utc(2024, 1, 2, 9, 0), Some(utc(2024, 1, 2, 11, 0)), 0),
    ];

    let distribution = job_distribution(&entries, InvalidEntryPolicy::Reject).unwrap();
    let keys: Vec<&str> = distribution.iter().map(|p| p.bucket_key.as_str()).collect();
    assert_eq!(keys, vec!["job-z", "job-a"]);
    assert_eq!(distribution[0].hours, 3.0);
    assert_eq!(distribution[0].earnings, 30.0);
    assert_eq!(distribution[1].earnings, 120.0);
}

#[test]
fn test_job_distribution_empty() {
    let distribution = job_distribution(&[], InvalidEntryPolicy::Reject).unwrap();
    assert!(distribution.is_empty());
}

// ===== weekly_pattern Tests =====

#[test]
fn test_weekly_pattern_empty_has_seven_zeroed_days() {
    let pattern = weekly_pattern(&[], utc_offset(), InvalidEntryPolicy::Reject).unwrap();

    assert_eq!(pattern.len(), 7);
    for (index, point) in pattern.iter().enumerate() {
        assert_eq!(point.bucket_key, index.to_string());
        assert_eq!(point.label.as_deref(), Some(WEEKDAY_NAMES[index]));
        assert_eq!(point.hours, 0.0);
        assert_eq!(point.earnings, 0.0);
        assert_eq!(point.entry_count, 0);
    }
    assert_eq!(pattern[0].label.as_deref(), Some("Sunday"));
    assert_eq!(pattern[6].label.as_deref(), Some("Saturday"));
}

#[test]
fn test_weekly_pattern_groups_by_weekday() {
    let job = create_job("job-a", "Cafe", 10.0);
    // 2024-01-01 is a Monday, 2024-01-07 a Sunday
    let entries = vec![
        create_entry("mon-1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 12, 0)), 0),
        create_entry("mon-2", &job, utc(2024, 1, 8, 9, 0), Some(utc(2024, 1, 8, 10, 0)), 0),
        create_entry("sun", &job, utc(2024, 1, 7, 9, 0), Some(utc(2024, 1, 7, 11, 0)), 0),
    ];

    let pattern = weekly_pattern(&entries, utc_offset(), InvalidEntryPolicy::Reject).unwrap();
    assert_eq!(pattern[1].hours, 4.0);
    assert_eq!(pattern[1].entry_count, 2);
    assert_eq!(pattern[1].earnings, 40.0);
    assert_eq!(pattern[0].hours, 2.0);
    assert_eq!(pattern[2].entry_count, 0);
}

#[test]
fn test_weekly_pattern_uses_local_weekday() {
    let job = create_job("job-a", "Cafe", 10.0);
    // Monday 02:00 UTC is still Sunday evening at UTC-5
    let entries = vec![create_entry(
        "late",
        &job,
        utc(2024, 1, 1, 2, 0),
        Some(utc(2024, 1, 1, 3, 0)),
        0,
    )];
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();

    let pattern = weekly_pattern(&entries, offset, InvalidEntryPolicy::Reject).unwrap();
    assert_eq!(pattern[0].entry_count, 1);
    assert_eq!(pattern[1].entry_count, 0);
}

// ===== earnings_trend Tests =====

#[test]
fn test_earnings_trend_daily_buckets_sorted() {
    let job = create_job("job-a", "Cafe", 10.0);
    let entries = vec![
        create_entry("e3", &job, utc(2024, 1, 3, 9, 0), Some(utc(2024, 1, 3, 10, 0)), 0),
        create_entry("e1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 10, 0)), 0),
        create_entry("e1b", &job, utc(2024, 1, 1, 14, 0), Some(utc(2024, 1, 1, 16, 0)), 0),
    ];

    let trend = earnings_trend(&entries, Period::Week, utc_offset(), InvalidEntryPolicy::Reject).unwrap();
    let keys: Vec<&str> = trend.iter().map(|p| p.bucket_key.as_str()).collect();
    assert_eq!(keys, vec!["2024-01-01", "2024-01-03"]);
    assert_eq!(trend[0].hours, 3.0);
    assert_eq!(trend[0].earnings, 30.0);
    assert_eq!(trend[0].entry_count, 2);
    assert!(trend[0].label.is_none());
}

#[test]
fn test_earnings_trend_month_period_keeps_daily_keys() {
    let job = create_job("job-a", "Cafe", 10.0);
    let entries = vec![
        create_entry("e1", &job, utc(2024, 1, 1, 9, 0), Some(utc(2024, 1, 1, 10, 0)), 0),
        create_entry("e2", &job, utc(2024, 1, 20, 9, 0), Some(utc(2024, 1, 20, 10, 0)), 0),
    ];

    let trend = earnings_trend(&entries, Period::Month, utc_offset(), InvalidEntryPolicy::Reject).unwrap();
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].bucket_key, "2024-01-01");
    assert_eq!(trend[1].bucket_key, "2024-01-20");
}

#[test]
fn test_earnings_trend_year_period_uses_month_keys() {
    let job = create_job("job-a", "Cafe", 10.0);
    let entries = vec![
        create_entry("e1", &job, utc(2024, 3, 1, 9, 0), Some(utc(2024, 3, 1, 10, 0)), 0),
        create_entry("e2", &job, utc(2024, 1, 20, 9, 0), Some(utc(2024, 1, 20, 10, 0)), 0),
        create_entry("e3", &job, utc(2024, 1, 5, 9, 0), Some(utc(2024, 1, 5, 11, 0)), 0),
    ];

    let trend = earnings_trend(&entries, Period::Year, utc_offset(), InvalidEntryPolicy::Reject).unwrap();
    let keys: Vec<&str> = trend.iter().map(|p| p.bucket_key.as_str()).collect();
    assert_eq!(keys, vec!["2024-01", "2024-03"]);
    assert_eq!(trend[0].hours, 3.0);
}

// ===== Property Tests =====

fn arb_entries() -> impl Strategy<Value = Vec<WorkEntry>> {
    let jobs = vec![
        create_job("job-a", "Cafe", 20.0),
        create_job("job-b", "Tutor", 35.5),
        create_job("job-c", "Delivery", 0.0),
    ];

    prop::collection::vec(
        (0usize..3, 0i64..(60 * 24 * 90), 0i64..720, 0u32..=720),
        0..40,
    )
    .prop_map(move |specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (job_index, start_minute, length, break_minutes))| {
                let start = utc(2024, 1, 1, 0, 0) + Duration::minutes(start_minute);
                let end = start + Duration::minutes(length);
                let break_minutes = break_minutes.min(length as u32);
                create_entry(&format!("e{}", index), &jobs[job_index], start, Some(end), break_minutes)
            })
            .collect()
    })
}

proptest! {
    /// Invariant: distribution hours add up to the net hours of all entries
    #[test]
    fn prop_distribution_preserves_total_hours(entries in arb_entries()) {
        let distribution = job_distribution(&entries, InvalidEntryPolicy::Reject).unwrap();
        let grouped: f64 = distribution.iter().map(|p| p.hours).sum();
        let direct: f64 = entries.iter().map(|e| net_hours(e).unwrap()).sum();

        prop_assert!((grouped - direct).abs() < 1e-9);
        let counted: u32 = distribution.iter().map(|p| p.entry_count).sum();
        prop_assert_eq!(counted as usize, entries.len());
    }

    /// Invariant: aggregators are deterministic for the same input
    #[test]
    fn prop_aggregators_are_idempotent(entries in arb_entries()) {
        let policy = InvalidEntryPolicy::Reject;
        prop_assert_eq!(
            job_distribution(&entries, policy).unwrap(),
            job_distribution(&entries, policy).unwrap()
        );
        prop_assert_eq!(
            weekly_pattern(&entries, utc_offset(), policy).unwrap(),
            weekly_pattern(&entries, utc_offset(), policy).unwrap()
        );
        prop_assert_eq!(
            earnings_trend(&entries, Period::Day, utc_offset(), policy).unwrap(),
            earnings_trend(&entries, Period::Day, utc_offset(), policy).unwrap()
        );
    }

    /// Invariant: time buckets come out strictly ascending by key
    #[test]
    fn prop_trend_buckets_sorted(entries in arb_entries()) {
        for period in [Period::Day, Period::Week, Period::Month, Period::Year] {
            let trend = earnings_trend(&entries, period, utc_offset(), InvalidEntryPolicy::Reject).unwrap();
            for pair in trend.windows(2) {
                prop_assert!(pair[0].bucket_key < pair[1].bucket_key);
            }
        }
    }

    /// Invariant: the weekly pattern always has seven days and loses no entries
    #[test]
    fn prop_weekly_pattern_complete(entries in arb_entries()) {
        let pattern = weekly_pattern(&entries, utc_offset(), InvalidEntryPolicy::Reject).unwrap();
        prop_assert_eq!(pattern.len(), 7);
        let counted: u32 = pattern.iter().map(|p| p.entry_count).sum();
        prop_assert_eq!(counted as usize, entries.len());
    }

    /// Invariant: zero-break entries work exactly their shift length
    #[test]
    fn prop_zero_break_is_shift_length(minutes in 0i64..(60 * 24)) {
        let job = create_job("job-a", "Cafe", 20.0);
        let start = utc(2024, 1, 1, 0, 0);
        let entry = create_entry("e", &job, start, Some(start + Duration::minutes(minutes)), 0);
        prop_assert_eq!(net_hours(&entry).unwrap(), minutes as f64 / 60.0);
    }
}
