//! Work entry CRUD operations
//!
//! Entries are always read joined with their job, so every returned
//! [`WorkEntry`] carries the job's current name and wage.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, EntryFilter, StorageError};
use crate::models::{
    normalize_notes, validate_shift, Job, NewWorkEntry, WorkEntry, WorkEntryUpdate,
};
use crate::storage::Database;

const ENTRY_SELECT: &str = "SELECT e.id, e.user_id, e.start_time, e.end_time, \
     e.break_duration_minutes, e.notes, e.created_at, \
     j.id, j.user_id, j.name, j.hourly_wage, j.created_at \
     FROM work_entries e JOIN jobs j ON j.id = e.job_id";

fn entry_from_row(row: &Row) -> rusqlite::Result<WorkEntry> {
    let start_time: String = row.get(2)?;
    let end_time: Option<String> = row.get(3)?;
    let created_at: String = row.get(6)?;
    let job_created_at: String = row.get(11)?;

    Ok(WorkEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        start_time: parse_timestamp(2, &start_time)?,
        end_time: end_time
            .as_deref()
            .map(|value| parse_timestamp(3, value))
            .transpose()?,
        break_duration_minutes: row.get(4)?,
        notes: row.get(5)?,
        created_at: parse_timestamp(6, &created_at)?,
        job: Job {
            id: row.get(7)?,
            user_id: row.get(8)?,
            name: row.get(9)?,
            hourly_wage: row.get(10)?,
            created_at: parse_timestamp(11, &job_created_at)?,
        },
    })
}

impl Database {
    /// Resolves a job referenced from an entry payload
    fn referenced_job(&self, user_id: &str, job_id: &str) -> Result<Job, StorageError> {
        self.get_job(user_id, job_id).map_err(|e| match e {
            StorageError::JobNotFound(id) => {
                StorageError::InvalidInput(format!("unknown job {}", id))
            }
            other => other,
        })
    }

    /// Record a work entry for a user
    ///
    /// The referenced job must belong to the same user and the shift must be
    /// well formed (end not before start, break shorter than the shift).
    pub fn create_work_entry(
        &self,
        user_id: &str,
        new_entry: &NewWorkEntry,
    ) -> Result<WorkEntry, StorageError> {
        let job = self.referenced_job(user_id, &new_entry.job_id)?;
        // Stored timestamps keep milliseconds
        let start_time = new_entry.start_time.trunc_subsecs(3);
        let end_time = new_entry.end_time.map(|t| t.trunc_subsecs(3));
        validate_shift(start_time, end_time, new_entry.break_duration_minutes)
            .map_err(StorageError::InvalidInput)?;
        let notes =
            normalize_notes(new_entry.notes.as_deref()).map_err(StorageError::InvalidInput)?;

        let entry = WorkEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            job,
            start_time,
            end_time,
            break_duration_minutes: new_entry.break_duration_minutes,
            notes,
            created_at: Utc::now().trunc_subsecs(3),
        };

        self.connection().execute(
            "INSERT INTO work_entries (id, user_id, job_id, start_time, end_time, break_duration_minutes, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id,
                entry.user_id,
                entry.job.id,
                format_timestamp(&entry.start_time),
                entry.end_time.as_ref().map(format_timestamp),
                entry.break_duration_minutes,
                entry.notes,
                format_timestamp(&entry.created_at)
            ],
        )?;

        debug!(entry_id = %entry.id, user_id, running = entry.is_running(), "Created work entry");
        Ok(entry)
    }

    /// List a user's work entries ordered by start time
    pub fn list_work_entries(
        &self,
        user_id: &str,
        filter: &EntryFilter,
    ) -> Result<Vec<WorkEntry>, StorageError> {
        let mut sql = format!("{} WHERE e.user_id = ?1", ENTRY_SELECT);
        let mut values = vec![user_id.to_string()];

        if let Some(range) = &filter.range {
            values.push(format_timestamp(&range.start));
            sql.push_str(&format!(" AND e.start_time >= ?{}", values.len()));
            values.push(format_timestamp(&range.end));
            sql.push_str(&format!(" AND e.start_time < ?{}", values.len()));
        }
        if let Some(job_id) = &filter.job_id {
            values.push(job_id.clone());
            sql.push_str(&format!(" AND e.job_id = ?{}", values.len()));
        }
        sql.push_str(" ORDER BY e.start_time ASC, e.created_at ASC");

        let mut stmt = self.connection().prepare(&sql)?;
        let entries = stmt
            .query_map(params_from_iter(values.iter()), entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Get one of a user's work entries
    pub fn get_work_entry(&self, user_id: &str, entry_id: &str) -> Result<WorkEntry, StorageError> {
        self.connection()
            .query_row(
                &format!("{} WHERE e.id = ?1 AND e.user_id = ?2", ENTRY_SELECT),
                params![entry_id, user_id],
                entry_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::EntryNotFound(entry_id.to_string()))
    }

    /// Apply a partial update to a work entry
    ///
    /// The merged entry is validated as a whole, so moving only the start
    /// time past the existing end time is rejected.
    pub fn update_work_entry(
        &self,
        user_id: &str,
        entry_id: &str,
        update: &WorkEntryUpdate,
    ) -> Result<WorkEntry, StorageError> {
        let mut entry = self.get_work_entry(user_id, entry_id)?;

        if let Some(job_id) = &update.job_id {
            if *job_id != entry.job.id {
                entry.job = self.referenced_job(user_id, job_id)?;
            }
        }
        if let Some(start_time) = update.start_time {
            entry.start_time = start_time.trunc_subsecs(3);
        }
        if let Some(end_time) = update.end_time {
            entry.end_time = Some(end_time.trunc_subsecs(3));
        }
        if let Some(minutes) = update.break_duration_minutes {
            entry.break_duration_minutes = minutes;
        }
        if let Some(notes) = &update.notes {
            entry.notes =
                normalize_notes(Some(notes.as_str())).map_err(StorageError::InvalidInput)?;
        }

        validate_shift(entry.start_time, entry.end_time, entry.break_duration_minutes)
            .map_err(StorageError::InvalidInput)?;
        self.write_entry(&entry)?;
        Ok(entry)
    }

    /// End a running work entry at `end_time`
    pub fn stop_work_entry(
        &self,
        user_id: &str,
        entry_id: &str,
        end_time: DateTime<Utc>,
    ) -> Result<WorkEntry, StorageError> {
        let mut entry = self.get_work_entry(user_id, entry_id)?;
        if !entry.is_running() {
            return Err(StorageError::InvalidInput(format!(
                "work entry {} has already ended",
                entry_id
            )));
        }

        let end_time = end_time.trunc_subsecs(3);
        validate_shift(entry.start_time, Some(end_time), entry.break_duration_minutes)
            .map_err(StorageError::InvalidInput)?;
        entry.end_time = Some(end_time);
        self.write_entry(&entry)?;

        debug!(entry_id, user_id, "Stopped work entry");
        Ok(entry)
    }

    /// Delete a work entry
    pub fn delete_work_entry(&self, user_id: &str, entry_id: &str) -> Result<(), StorageError> {
        let deleted = self.connection().execute(
            "DELETE FROM work_entries WHERE id = ?1 AND user_id = ?2",
            params![entry_id, user_id],
        )?;

        if deleted == 0 {
            return Err(StorageError::EntryNotFound(entry_id.to_string()));
        }
        Ok(())
    }

    fn write_entry(&self, entry: &WorkEntry) -> Result<(), StorageError> {
        self.connection().execute(
            "UPDATE work_entries
             SET job_id = ?1, start_time = ?2, end_time = ?3, break_duration_minutes = ?4, notes = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                entry.job.id,
                format_timestamp(&entry.start_time),
                entry.end_time.as_ref().map(format_timestamp),
                entry.break_duration_minutes,
                entry.notes,
                entry.id,
                entry.user_id
            ],
        )?;
        Ok(())
    }
}
