//! Postgres-backed user account store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::applications::repository::{RepositoryError, UserDirectory};
use crate::models::user::UserRecord;

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fails `Conflict` when the email is already registered (unique index).
    pub async fn insert(&self, user: &UserRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, phone, location, skills,
                                experience, resume, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.location)
        .bind(&user.skills)
        .bind(user.experience)
        .bind(&user.resume)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
            _ => RepositoryError::Database(e),
        })?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Sets the résumé storage key; empty string clears it.
    pub async fn set_resume(&self, id: Uuid, key: &str) -> Result<UserRecord, RepositoryError> {
        let user: Option<UserRecord> =
            sqlx::query_as("UPDATE users SET resume = $1 WHERE id = $2 RETURNING *")
                .bind(key)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        user.ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl UserDirectory for PgUserStore {
    async fn find(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_by_id(id).await
    }
}
