//! Per-endpoint response projections.
//!
//! Stored rows stay normalized; each endpoint exposes its own slice of the
//! joined job/applicant fields. The field lists are deliberate and differ
//! per viewer: an employer listing applicants sees contact, skills and the
//! résumé reference, never résumé content.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::models::job::JobRecord;
use crate::models::user::UserRecord;

#[derive(Debug, Serialize)]
pub struct JobCard {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct JobOverview {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
}

#[derive(Debug, Serialize)]
pub struct JobDetailView {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: String,
    pub salary: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicantRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub resume: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicantContact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicantProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume: String,
    pub skills: Vec<String>,
    pub experience: i32,
}

/// Response to a fresh submission.
#[derive(Debug, Serialize)]
pub struct SubmittedApplicationView {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub coverletter: String,
    pub applied_at: DateTime<Utc>,
    pub job: JobCard,
    pub applicant: ApplicantRef,
}

/// An applicant's own submission, with a job overview.
#[derive(Debug, Serialize)]
pub struct OwnApplicationView {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub coverletter: String,
    pub applied_at: DateTime<Utc>,
    pub job: JobOverview,
}

/// Full detail for the applicant or the owning employer.
#[derive(Debug, Serialize)]
pub struct ApplicationDetailView {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub coverletter: String,
    pub applied_at: DateTime<Utc>,
    pub job: JobDetailView,
    pub applicant: ApplicantContact,
}

/// One row of an employer's per-job applicant listing.
#[derive(Debug, Serialize)]
pub struct JobApplicationView {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub coverletter: String,
    pub applied_at: DateTime<Utc>,
    pub applicant: ApplicantProfile,
}

pub fn submitted_view(
    record: &ApplicationRecord,
    job: &JobRecord,
    applicant: &UserRecord,
) -> SubmittedApplicationView {
    SubmittedApplicationView {
        id: record.id,
        status: record.status,
        coverletter: record.coverletter.clone(),
        applied_at: record.applied_at,
        job: JobCard {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
        },
        applicant: ApplicantRef {
            id: applicant.id,
            name: applicant.name.clone(),
            email: applicant.email.clone(),
            resume: applicant.resume.clone(),
        },
    }
}

pub fn own_view(record: &ApplicationRecord, job: &JobRecord) -> OwnApplicationView {
    OwnApplicationView {
        id: record.id,
        status: record.status,
        coverletter: record.coverletter.clone(),
        applied_at: record.applied_at,
        job: JobOverview {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
        },
    }
}

pub fn detail_view(
    record: &ApplicationRecord,
    job: &JobRecord,
    applicant: &UserRecord,
) -> ApplicationDetailView {
    ApplicationDetailView {
        id: record.id,
        status: record.status,
        coverletter: record.coverletter.clone(),
        applied_at: record.applied_at,
        job: JobDetailView {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
        },
        applicant: ApplicantContact {
            id: applicant.id,
            name: applicant.name.clone(),
            email: applicant.email.clone(),
            phone: applicant.phone.clone(),
            resume: applicant.resume.clone(),
        },
    }
}

pub fn job_application_view(
    record: &ApplicationRecord,
    applicant: &UserRecord,
) -> JobApplicationView {
    JobApplicationView {
        id: record.id,
        status: record.status,
        coverletter: record.coverletter.clone(),
        applied_at: record.applied_at,
        applicant: ApplicantProfile {
            id: applicant.id,
            name: applicant.name.clone(),
            email: applicant.email.clone(),
            phone: applicant.phone.clone(),
            resume: applicant.resume.clone(),
            skills: applicant.skills.clone(),
            experience: applicant.experience,
        },
    }
}
