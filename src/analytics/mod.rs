//! Analytics module for wage and work-time statistics
//!
//! Turns a list of work entries into derived statistics for the dashboard:
//! net hours and earnings per entry, period summaries with trends, earnings
//! time series, per-job distribution and weekday patterns.
//!
//! ## Architecture
//!
//! - **Calculator**: net hours, earnings, trend percentages and the
//!   distribution / weekly / time-bucket aggregators
//! - **Period**: bucket keys and current / previous window resolution
//! - **Summary**: composes the above into current-vs-previous views
//!
//! Every function here is pure. Entries are passed in as plain slices loaded
//! by the caller; nothing in this module touches storage or holds state
//! between calls.

mod error;
mod types;


pub use error::AnalyticsError;
pub use types::*;

/// Calculator module for metrics and aggregation
pub mod calculator;

#[cfg(test)]
mod calculator_tests;

/// Period bucketing and date window resolution
pub mod period;


/// Current-vs-previous summaries and range comparisons
pub mod summary;
