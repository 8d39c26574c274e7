use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Review status of an application. No transition graph is enforced: the
/// owning employer may set any value in any order (last writer wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Parsed explicitly (rather than via serde on the request body) so an
/// out-of-enum value surfaces as a `VALIDATION_ERROR`, not a 422 from the
/// JSON extractor.
impl FromStr for ApplicationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(()),
        }
    }
}

/// Stored application row. Job and applicant fields are kept normalized;
/// response enrichment happens in `applications::views`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub coverletter: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}
