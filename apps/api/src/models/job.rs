use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "job_type", rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl Default for JobType {
    fn default() -> Self {
        JobType::FullTime
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub location: String,
    /// Free text, e.g. "90-120k" or "negotiable".
    pub salary: String,
    pub jobtype: JobType,
    pub employer_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
