//! Wagebook data models
//!
//! Jobs (what a user is paid for) and work entries (individual shifts logged
//! against a job). These are the snapshots the analytics module consumes and
//! the records the storage layer persists.

pub mod job;
pub mod work_entry;

pub use job::*;
pub use work_entry::*;
