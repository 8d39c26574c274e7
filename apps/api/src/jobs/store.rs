//! Postgres-backed job record store.
//!
//! The lifecycle engine only needs `JobStore::find`; the rest of the CRUD
//! surface here backs the job posting endpoints.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::applications::repository::{JobStore, RepositoryError};
use crate::models::job::{JobRecord, JobType};

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub jobtype: Option<JobType>,
    pub is_active: Option<bool>,
}

/// Case-insensitive substring filters for the public listing. No ranking.
#[derive(Debug, Default)]
pub struct JobFilter {
    pub title: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub jobtype: Option<JobType>,
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, job: &JobRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO jobs (id, title, company, description, requirements, location, salary,
                               jobtype, employer_id, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(job.jobtype)
        .bind(job.employer_id)
        .bind(job.is_active)
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&self, id: Uuid, patch: &JobPatch) -> Result<JobRecord, RepositoryError> {
        let record: Option<JobRecord> = sqlx::query_as(
            "UPDATE jobs SET
                 title        = COALESCE($2, title),
                 company      = COALESCE($3, company),
                 description  = COALESCE($4, description),
                 requirements = COALESCE($5, requirements),
                 location     = COALESCE($6, location),
                 salary       = COALESCE($7, salary),
                 jobtype      = COALESCE($8, jobtype),
                 is_active    = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.company)
        .bind(&patch.description)
        .bind(&patch.requirements)
        .bind(&patch.location)
        .bind(&patch.salary)
        .bind(patch.jobtype)
        .bind(patch.is_active)
        .fetch_optional(&self.pool)
        .await?;
        record.ok_or(RepositoryError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn list_active(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, RepositoryError> {
        let records = sqlx::query_as(
            "SELECT * FROM jobs
             WHERE is_active = TRUE
               AND ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
               AND ($2::text IS NULL OR location ILIKE '%' || $2 || '%')
               AND ($3::text IS NULL OR company ILIKE '%' || $3 || '%')
               AND ($4::job_type IS NULL OR jobtype = $4)
             ORDER BY created_at DESC",
        )
        .bind(&filter.title)
        .bind(&filter.location)
        .bind(&filter.company)
        .bind(filter.jobtype)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    pub async fn list_by_employer(
        &self,
        employer_id: Uuid,
    ) -> Result<Vec<JobRecord>, RepositoryError> {
        let records =
            sqlx::query_as("SELECT * FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC")
                .bind(employer_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(records)
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn find(&self, id: Uuid) -> Result<Option<JobRecord>, RepositoryError> {
        let record = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }
}
