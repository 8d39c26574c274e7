use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Actor role. Job seekers submit applications; employers own jobs and
/// review applications against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Jobseeker,
    Employer,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: String,
    pub location: String,
    pub skills: Vec<String>,
    /// Years of experience.
    pub experience: i32,
    /// Opaque résumé storage key; empty string means no résumé on file.
    pub resume: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn has_resume(&self) -> bool {
        !self.resume.is_empty()
    }
}
