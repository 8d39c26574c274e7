pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::users::handlers as users;
use crate::users::resume::MAX_RESUME_BYTES;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users & credentials
        .route("/api/users/register", post(users::handle_register))
        .route("/api/users/login", post(users::handle_login))
        .route("/api/users/profile", get(users::handle_profile))
        .route("/api/users/upload-resume", post(users::handle_upload_resume))
        .route("/api/users/resume", delete(users::handle_delete_resume))
        // Job postings
        .route("/api/jobs", post(jobs::handle_create).get(jobs::handle_list))
        .route("/api/jobs/employer", get(jobs::handle_employer_jobs))
        .route(
            "/api/jobs/:id",
            get(jobs::handle_detail)
                .patch(jobs::handle_update)
                .delete(jobs::handle_delete),
        )
        // Applications. The :id segment is a job id for submit and the
        // per-job listing, an application id otherwise (the router requires
        // one param name per position).
        .route("/api/applications", get(applications::handle_list_own))
        .route(
            "/api/applications/:id",
            post(applications::handle_submit).get(applications::handle_detail),
        )
        .route(
            "/api/applications/:id/applications",
            get(applications::handle_list_for_job),
        )
        .route(
            "/api/applications/:id/status",
            patch(applications::handle_update_status),
        )
        // Multipart résumé uploads exceed axum's default body cap.
        .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + 64 * 1024))
        .with_state(state)
}
