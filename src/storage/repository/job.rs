//! Job CRUD operations

use chrono::{SubsecRound, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, StorageError};
use crate::models::{Job, JobUpdate, NewJob};
use crate::storage::Database;

const JOB_COLUMNS: &str = "id, user_id, name, hourly_wage, created_at";

fn job_from_row(row: &Row) -> rusqlite::Result<Job> {
    let created_at: String = row.get(4)?;
    Ok(Job {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        hourly_wage: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
    })
}

impl Database {
    /// Create a job for a user
    pub fn create_job(&self, user_id: &str, new_job: &NewJob) -> Result<Job, StorageError> {
        let new_job = new_job.validated().map_err(StorageError::InvalidInput)?;

        let job = Job {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: new_job.name,
            hourly_wage: new_job.hourly_wage,
            created_at: Utc::now().trunc_subsecs(3),
        };

        self.connection().execute(
            "INSERT INTO jobs (id, user_id, name, hourly_wage, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                job.id,
                job.user_id,
                job.name,
                job.hourly_wage,
                format_timestamp(&job.created_at)
            ],
        )?;

        debug!(job_id = %job.id, user_id, "Created job");
        Ok(job)
    }

    /// List a user's jobs ordered by name
    pub fn list_jobs(&self, user_id: &str) -> Result<Vec<Job>, StorageError> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM jobs WHERE user_id = ?1 ORDER BY name COLLATE NOCASE, created_at",
            JOB_COLUMNS
        ))?;

        let jobs = stmt
            .query_map(params![user_id], job_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    /// Get one of a user's jobs
    pub fn get_job(&self, user_id: &str, job_id: &str) -> Result<Job, StorageError> {
        self.connection()
            .query_row(
                &format!("SELECT {} FROM jobs WHERE id = ?1 AND user_id = ?2", JOB_COLUMNS),
                params![job_id, user_id],
                job_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::JobNotFound(job_id.to_string()))
    }

    /// Apply a partial update to a job
    pub fn update_job(
        &self,
        user_id: &str,
        job_id: &str,
        update: &JobUpdate,
    ) -> Result<Job, StorageError> {
        let current = self.get_job(user_id, job_id)?;
        let job = update.apply_to(&current).map_err(StorageError::InvalidInput)?;

        self.connection().execute(
            "UPDATE jobs SET name = ?1, hourly_wage = ?2 WHERE id = ?3 AND user_id = ?4",
            params![job.name, job.hourly_wage, job_id, user_id],
        )?;

        Ok(job)
    }

    /// Delete a job; its work entries go with it
    pub fn delete_job(&self, user_id: &str, job_id: &str) -> Result<(), StorageError> {
        let deleted = self.connection().execute(
            "DELETE FROM jobs WHERE id = ?1 AND user_id = ?2",
            params![job_id, user_id],
        )?;

        if deleted == 0 {
            return Err(StorageError::JobNotFound(job_id.to_string()));
        }
        debug!(job_id, user_id, "Deleted job");
        Ok(())
    }
}
