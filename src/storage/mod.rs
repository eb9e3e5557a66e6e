//! Local storage module for Wagebook
//!
//! SQLite persistence for jobs and work entries. Every query is scoped to a
//! user id; rows belonging to other users behave as if they did not exist.

mod database;
mod error;
mod repository;

pub use database::Database;
pub use error::StorageError;
pub use repository::EntryFilter;
