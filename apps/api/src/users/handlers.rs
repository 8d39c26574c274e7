use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::applications::repository::RepositoryError;
use crate::auth::{issue_token, AuthUser};
use crate::errors::AppError;
use crate::models::user::{Role, UserRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: i32,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The slice of the user returned alongside a fresh token.
#[derive(Serialize)]
pub struct AuthUserSummary {
    id: Uuid,
    name: String,
    email: String,
    role: Role,
}

#[derive(Serialize)]
pub struct AuthResponse {
    message: &'static str,
    token: String,
    user: AuthUserSummary,
}

impl AuthResponse {
    fn new(message: &'static str, token: String, user: &UserRecord) -> Self {
        AuthResponse {
            message,
            token,
            user: AuthUserSummary {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                role: user.role,
            },
        }
    }
}

/// POST /api/users/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(AppError::Validation(
            "please provide a valid email".to_string(),
        ));
    }
    if req.password.len() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".to_string(),
        ));
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

    let user = UserRecord {
        id: Uuid::new_v4(),
        name: req.name,
        email: req.email.to_lowercase(),
        password_hash,
        phone: req.phone,
        location: req.location,
        skills: req.skills,
        experience: req.experience,
        resume: String::new(),
        role: req.role.unwrap_or(Role::Jobseeker),
        created_at: Utc::now(),
    };

    match state.users.insert(&user).await {
        Ok(()) => {}
        Err(RepositoryError::Conflict) => {
            return Err(AppError::Conflict("user already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let token = issue_token(&user, &state.config.jwt_secret)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(
            "user registered successfully",
            token,
            &user,
        )),
    ))
}

/// POST /api/users/login
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::Validation("invalid credentials".to_string());

    let user = state
        .users
        .find_by_email(&req.email.to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    let matches = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password verification failed: {e}")))?;
    if !matches {
        return Err(invalid());
    }

    let token = issue_token(&user, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse::new(
        "user logged in successfully",
        token,
        &user,
    )))
}

/// GET /api/users/profile
pub async fn handle_profile(AuthUser(user): AuthUser) -> Json<serde_json::Value> {
    Json(json!({
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "phone": user.phone,
            "location": user.location,
            "skills": user.skills,
            "experience": user.experience,
            "role": user.role,
            "resume": user.resume,
            "hasResume": user.has_resume(),
        }
    }))
}

/// POST /api/users/upload-resume — multipart, field name `resume`.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut uploaded: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("File upload error: {e}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("File upload error: {e}")))?;
        uploaded = Some(state.resumes.put(user.id, &content_type, data).await?);
        break;
    }

    let key = uploaded.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    // A previous résumé is superseded; remove its blob once the new key is
    // safely persisted.
    let previous = user.resume.clone();
    let updated = match state.users.set_resume(user.id, &key).await {
        Ok(updated) => updated,
        Err(e) => {
            // Don't leave an orphaned blob behind a failed row update.
            state.resumes.delete(&key).await;
            return Err(e.into());
        }
    };
    if !previous.is_empty() {
        state.resumes.delete(&previous).await;
    }

    let file_name = key.rsplit('/').next().unwrap_or(&key).to_string();
    Ok(Json(json!({
        "message": "Resume uploaded successfully",
        "fileName": file_name,
        "filePath": key,
        "user": {
            "id": updated.id,
            "name": updated.name,
            "email": updated.email,
            "resume": updated.resume,
            "hasResume": true,
        }
    })))
}

/// DELETE /api/users/resume
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    if !user.has_resume() {
        return Err(AppError::NotFound("No resume found".to_string()));
    }

    state.resumes.delete(&user.resume).await;
    state.users.set_resume(user.id, "").await?;

    Ok(Json(json!({ "message": "Resume deleted successfully" })))
}
