use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::repository::JobStore;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::jobs::store::{JobFilter, JobPatch};
use crate::models::job::{JobRecord, JobType};
use crate::models::user::{Role, UserRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub jobtype: JobType,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub jobtype: Option<JobType>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct JobListQuery {
    pub title: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub jobtype: Option<JobType>,
}

#[derive(Serialize)]
pub struct JobEnvelope {
    message: &'static str,
    job: JobRecord,
}

#[derive(Serialize)]
pub struct JobListEnvelope {
    message: &'static str,
    count: usize,
    jobs: Vec<JobRecord>,
}

fn require_employer(user: &UserRecord, action: &str) -> Result<(), AppError> {
    if user.role != Role::Employer {
        return Err(AppError::RoleForbidden(format!(
            "Access denied, only employers can {action}"
        )));
    }
    Ok(())
}

/// A job the caller does not own is off limits for edits and deletes.
fn require_owner(user: &UserRecord, job: &JobRecord, action: &str) -> Result<(), AppError> {
    if job.employer_id != user.id {
        return Err(AppError::AccessDenied(format!(
            "Access denied, you can only {action} your own jobs"
        )));
    }
    Ok(())
}

/// POST /api/jobs
pub async fn handle_create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobEnvelope>), AppError> {
    require_employer(&user, "create jobs")?;

    for (field, value) in [
        ("title", &req.title),
        ("company", &req.company),
        ("description", &req.description),
        ("location", &req.location),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("job {field} is required")));
        }
    }

    let job = JobRecord {
        id: Uuid::new_v4(),
        title: req.title,
        company: req.company,
        description: req.description,
        requirements: req.requirements,
        location: req.location,
        salary: req.salary,
        jobtype: req.jobtype,
        employer_id: user.id,
        is_active: true,
        created_at: Utc::now(),
    };
    state.jobs.insert(&job).await?;

    Ok((
        StatusCode::CREATED,
        Json(JobEnvelope {
            message: "Job created successfully",
            job,
        }),
    ))
}

/// PATCH /api/jobs/:id
pub async fn handle_update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobEnvelope>, AppError> {
    require_employer(&user, "update jobs")?;

    let job = state
        .jobs
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    require_owner(&user, &job, "update")?;

    let patch = JobPatch {
        title: req.title,
        company: req.company,
        description: req.description,
        requirements: req.requirements,
        location: req.location,
        salary: req.salary,
        jobtype: req.jobtype,
        is_active: req.is_active,
    };
    let job = state.jobs.update(id, &patch).await?;

    Ok(Json(JobEnvelope {
        message: "Job updated successfully",
        job,
    }))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_employer(&user, "delete jobs")?;

    let job = state
        .jobs
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    require_owner(&user, &job, "delete")?;

    state.jobs.delete(id).await?;
    Ok(Json(serde_json::json!({
        "message": "Job deleted successfully"
    })))
}

/// GET /api/jobs/employer
pub async fn handle_employer_jobs(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<JobListEnvelope>, AppError> {
    require_employer(&user, "view their jobs")?;

    let jobs = state.jobs.list_by_employer(user.id).await?;
    Ok(Json(JobListEnvelope {
        message: "Jobs retrieved successfully",
        count: jobs.len(),
        jobs,
    }))
}

/// GET /api/jobs — public, active postings only, optional filters.
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<JobListEnvelope>, AppError> {
    let filter = JobFilter {
        title: query.title,
        location: query.location,
        company: query.company,
        jobtype: query.jobtype,
    };
    let jobs = state.jobs.list_active(&filter).await?;
    Ok(Json(JobListEnvelope {
        message: "Jobs retrieved successfully",
        count: jobs.len(),
        jobs,
    }))
}

/// GET /api/jobs/:id — public.
pub async fn handle_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobEnvelope>, AppError> {
    let job = state
        .jobs
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    Ok(Json(JobEnvelope {
        message: "Job details retrieved successfully",
        job,
    }))
}
