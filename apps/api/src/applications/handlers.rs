use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct SubmitRequest {
    #[serde(default)]
    pub coverletter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct ApplicationEnvelope<T> {
    pub message: &'static str,
    pub application: T,
}

#[derive(Serialize)]
pub struct ApplicationListEnvelope<T> {
    pub message: &'static str,
    pub count: usize,
    pub applications: Vec<T>,
}

/// POST /api/applications/:jobId
pub async fn handle_submit(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<Uuid>,
    body: Option<Json<SubmitRequest>>,
) -> Result<(StatusCode, Json<impl Serialize>), AppError> {
    let coverletter = body.and_then(|Json(req)| req.coverletter);
    let application = state.applications.submit(&user, job_id, coverletter).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationEnvelope {
            message: "Application submitted successfully",
            application,
        }),
    ))
}

/// GET /api/applications
pub async fn handle_list_own(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<impl Serialize>, AppError> {
    let applications = state.applications.list_for_applicant(&user).await?;
    Ok(Json(ApplicationListEnvelope {
        message: "Applications retrieved successfully",
        count: applications.len(),
        applications,
    }))
}

/// GET /api/applications/:id
pub async fn handle_detail(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<impl Serialize>, AppError> {
    let application = state.applications.detail(&user, id).await?;
    Ok(Json(ApplicationEnvelope {
        message: "Application details retrieved",
        application,
    }))
}

/// GET /api/applications/:jobId/applications
pub async fn handle_list_for_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<impl Serialize>, AppError> {
    let applications = state.applications.list_for_job(&user, job_id).await?;
    Ok(Json(ApplicationListEnvelope {
        message: "Applications retrieved successfully",
        count: applications.len(),
        applications,
    }))
}

/// PATCH /api/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<impl Serialize>, AppError> {
    let application = state
        .applications
        .update_status(&user, id, &req.status)
        .await?;
    Ok(Json(ApplicationEnvelope {
        message: "Application status updated successfully",
        application,
    }))
}
