//! Storage contracts consumed by the lifecycle engine, plus the Postgres
//! implementation of the application repository.
//!
//! The (job_id, applicant_id) uniqueness constraint lives in the schema, not
//! in a pre-check: concurrent submissions for the same pair resolve to one
//! success and one `Conflict` at the insert itself.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::models::job::JobRecord;
use crate::models::user::UserRecord;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict => AppError::Conflict("record already exists".to_string()),
            RepositoryError::NotFound => AppError::NotFound("record not found".to_string()),
            RepositoryError::Database(e) => AppError::Database(e),
        }
    }
}

/// Persistence contract for application records. Ordering contract: the
/// `find_by_*` listings return newest submission first.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Fails `Conflict` when a record already exists for the same
    /// (job, applicant) pair.
    async fn insert(&self, application: &ApplicationRecord) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApplicationRecord>, RepositoryError>;

    async fn find_by_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<ApplicationRecord>, RepositoryError>;

    /// Sets the status field only. Fails `NotFound` when the record is
    /// absent; returns the updated record.
    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError>;
}

/// Job lookup as the engine sees it. The full CRUD surface lives on the
/// concrete store in `jobs::store`.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<JobRecord>, RepositoryError>;
}

/// User lookup for response enrichment.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError>;
}

pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn insert(&self, application: &ApplicationRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO applications (id, job_id, applicant_id, coverletter, status, applied_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.applicant_id)
        .bind(&application.coverletter)
        .bind(application.status)
        .bind(application.applied_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
            _ => RepositoryError::Database(e),
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let record = sqlx::query_as("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_by_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let records = sqlx::query_as(
            "SELECT * FROM applications WHERE applicant_id = $1 ORDER BY applied_at DESC",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let records =
            sqlx::query_as("SELECT * FROM applications WHERE job_id = $1 ORDER BY applied_at DESC")
                .bind(job_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(records)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let record: Option<ApplicationRecord> =
            sqlx::query_as("UPDATE applications SET status = $1 WHERE id = $2 RETURNING *")
                .bind(status)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        record.ok_or(RepositoryError::NotFound)
    }
}
