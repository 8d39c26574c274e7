//! Résumé blob storage over S3 / MinIO.
//!
//! Files are opaque to the rest of the system; only the storage key is
//! persisted on the user row. Gating is limited to content type and size.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_TYPES: [(&str, &str); 3] = [
    ("application/pdf", ".pdf"),
    ("application/msword", ".doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
];

pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

#[derive(Clone)]
pub struct ResumeStore {
    s3: S3Client,
    bucket: String,
}

impl ResumeStore {
    pub fn new(s3: S3Client, bucket: String) -> Self {
        Self { s3, bucket }
    }

    /// Validates type and size, uploads, and returns the storage key.
    pub async fn put(
        &self,
        user_id: Uuid,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, AppError> {
        let ext = extension_for(content_type).ok_or_else(|| {
            AppError::Validation(
                "Invalid file type. Only PDF, DOC, and DOCX files are allowed.".to_string(),
            )
        })?;
        if data.is_empty() {
            return Err(AppError::Validation("No file uploaded".to_string()));
        }
        if data.len() > MAX_RESUME_BYTES {
            return Err(AppError::Validation(
                "File too large. Maximum size allowed is 5MB.".to_string(),
            ));
        }

        let key = format!("resumes/{user_id}/{}{ext}", Utc::now().timestamp_millis());
        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("resume upload failed: {e}")))?;
        Ok(key)
    }

    /// Best effort: a missing blob must not block clearing the reference.
    pub async fn delete(&self, key: &str) {
        if let Err(e) = self
            .s3
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            warn!("failed to delete resume blob {key}: {e}");
        }
    }
}
