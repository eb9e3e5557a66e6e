//! Job data models
//!
//! A job is a named source of income with an hourly wage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A job the user logs work against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job unique ID (UUID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Hourly wage, non-negative
    pub hourly_wage: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a job
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub name: String,
    pub hourly_wage: f64,
}

/// Partial update of a job; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub name: Option<String>,
    pub hourly_wage: Option<f64>,
}

/// Validates a job name, returning the trimmed name
pub fn validate_job_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("job name must not be empty".to_string());
    }
    if trimmed.chars().count() > 100 {
        return Err("job name must be at most 100 characters".to_string());
    }
    Ok(trimmed.to_string())
}

/// Validates an hourly wage
pub fn validate_hourly_wage(wage: f64) -> Result<(), String> {
    if !wage.is_finite() {
        return Err("hourly wage must be a finite number".to_string());
    }
    if wage < 0.0 {
        return Err(format!("hourly wage must not be negative (got {})", wage));
    }
    Ok(())
}

impl NewJob {
    /// Validates the payload and returns a normalized copy
    pub fn validated(&self) -> Result<NewJob, String> {
        let name = validate_job_name(&self.name)?;
        validate_hourly_wage(self.hourly_wage)?;
        Ok(NewJob {
            name,
            hourly_wage: self.hourly_wage,
        })
    }
}

impl JobUpdate {
    /// Applies the update to an existing job after validating it
    pub fn apply_to(&self, job: &Job) -> Result<Job, String> {
        let mut updated = job.clone();
        if let Some(name) = &self.name {
            updated.name = validate_job_name(name)?;
        }
        if let Some(wage) = self.hourly_wage {
            validate_hourly_wage(wage)?;
            updated.hourly_wage = wage;
        }
        Ok(updated)
    }
}
