//! Application lifecycle engine.
//!
//! Owns the apply and advance-status workflows. Every operation is
//! authorized through `policy` before any mutation; the duplicate check is
//! delegated to the repository's unique constraint so concurrent submissions
//! cannot both succeed.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::applications::policy::{self, Operation, Resource};
use crate::applications::repository::{
    ApplicationRepository, JobStore, RepositoryError, UserDirectory,
};
use crate::applications::views::{
    self, ApplicationDetailView, JobApplicationView, OwnApplicationView, SubmittedApplicationView,
};
use crate::errors::AppError;
use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::models::job::JobRecord;
use crate::models::user::UserRecord;

#[derive(Clone)]
pub struct ApplicationEngine {
    repo: Arc<dyn ApplicationRepository>,
    jobs: Arc<dyn JobStore>,
    users: Arc<dyn UserDirectory>,
}

impl ApplicationEngine {
    pub fn new(
        repo: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self { repo, jobs, users }
    }

    /// Submit an application for `job_id` on behalf of `actor`.
    ///
    /// Check order: role, résumé prerequisite, job existence, then the
    /// insert itself (which is where duplicates are refused).
    pub async fn submit(
        &self,
        actor: &UserRecord,
        job_id: Uuid,
        coverletter: Option<String>,
    ) -> Result<SubmittedApplicationView, AppError> {
        policy::authorize(&actor.into(), Operation::SubmitApplication, &Resource::None)
            .require()?;

        if !actor.has_resume() {
            return Err(AppError::PrerequisiteMissing(
                "Please upload your resume first".to_string(),
            ));
        }

        let job = self
            .jobs
            .find(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

        let record = ApplicationRecord {
            id: Uuid::new_v4(),
            job_id,
            applicant_id: actor.id,
            coverletter: coverletter.unwrap_or_default(),
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
        };

        match self.repo.insert(&record).await {
            Ok(()) => {}
            Err(RepositoryError::Conflict) => {
                return Err(AppError::Conflict(
                    "You have already applied for this job".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        info!(application_id = %record.id, job_id = %job_id, applicant_id = %actor.id,
              "application submitted");
        Ok(views::submitted_view(&record, &job, actor))
    }

    /// All of `actor`'s own submissions, newest first, with job overviews.
    pub async fn list_for_applicant(
        &self,
        actor: &UserRecord,
    ) -> Result<Vec<OwnApplicationView>, AppError> {
        let records = self.repo.find_by_applicant(actor.id).await?;
        let mut out = Vec::with_capacity(records.len());
        for record in &records {
            let job = self.require_job(record).await?;
            out.push(views::own_view(record, &job));
        }
        Ok(out)
    }

    /// Single application detail, visible to its applicant and the owning
    /// employer only.
    pub async fn detail(
        &self,
        actor: &UserRecord,
        application_id: Uuid,
    ) -> Result<ApplicationDetailView, AppError> {
        let record = self
            .repo
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
        let job = self.require_job(&record).await?;

        policy::authorize(
            &actor.into(),
            Operation::ViewApplication,
            &Resource::Application {
                applicant_id: record.applicant_id,
                job_employer_id: job.employer_id,
            },
        )
        .require()?;

        let applicant = self.require_applicant(&record).await?;
        Ok(views::detail_view(&record, &job, &applicant))
    }

    /// Every application for `job_id`, newest first, for the owning
    /// employer. Role is checked before the job is loaded.
    pub async fn list_for_job(
        &self,
        actor: &UserRecord,
        job_id: Uuid,
    ) -> Result<Vec<JobApplicationView>, AppError> {
        let actor_ref = actor.into();
        policy::check_role(&actor_ref, Operation::ListJobApplications).require()?;

        let job = self
            .jobs
            .find(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

        policy::authorize(
            &actor_ref,
            Operation::ListJobApplications,
            &Resource::Job {
                employer_id: job.employer_id,
            },
        )
        .require()?;

        let records = self.repo.find_by_job(job_id).await?;
        let mut out = Vec::with_capacity(records.len());
        for record in &records {
            let applicant = self.require_applicant(record).await?;
            out.push(views::job_application_view(record, &applicant));
        }
        Ok(out)
    }

    /// Set the review status. Any of the four values may be set in any
    /// order; last writer wins. Nothing is mutated when a check fails.
    pub async fn update_status(
        &self,
        actor: &UserRecord,
        application_id: Uuid,
        status: &str,
    ) -> Result<ApplicationRecord, AppError> {
        let status: ApplicationStatus = status
            .parse()
            .map_err(|()| AppError::Validation("Invalid status value".to_string()))?;

        let actor_ref = actor.into();
        policy::check_role(&actor_ref, Operation::UpdateApplicationStatus).require()?;

        let record = self
            .repo
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
        let job = self.require_job(&record).await?;

        policy::authorize(
            &actor_ref,
            Operation::UpdateApplicationStatus,
            &Resource::Application {
                applicant_id: record.applicant_id,
                job_employer_id: job.employer_id,
            },
        )
        .require()?;

        let updated = match self.repo.update_status(application_id, status).await {
            Ok(updated) => updated,
            Err(RepositoryError::NotFound) => {
                return Err(AppError::NotFound("Application not found".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        info!(application_id = %application_id, status = status.as_str(),
              "application status updated");
        Ok(updated)
    }

    /// Job existence is only guaranteed at submission time. A missing job on
    /// a later read means the store is inconsistent, not that the
    /// application is absent.
    async fn require_job(&self, record: &ApplicationRecord) -> Result<JobRecord, AppError> {
        self.jobs.find(record.job_id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "job {} referenced by application {} is missing",
                record.job_id,
                record.id
            ))
        })
    }

    async fn require_applicant(&self, record: &ApplicationRecord) -> Result<UserRecord, AppError> {
        self.users.find(record.applicant_id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "applicant {} referenced by application {} is missing",
                record.applicant_id,
                record.id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobType;
    use crate::models::user::Role;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    /// In-memory repository double. Uniqueness is enforced under the lock,
    /// so it is atomic with the insert just like the real unique key.
    #[derive(Default)]
    struct MemoryApplications {
        rows: Mutex<Vec<ApplicationRecord>>,
    }

    impl MemoryApplications {
        fn snapshot(&self) -> Vec<ApplicationRecord> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ApplicationRepository for MemoryApplications {
        async fn insert(&self, application: &ApplicationRecord) -> Result<(), RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            if rows
                .iter()
                .any(|r| r.job_id == application.job_id && r.applicant_id == application.applicant_id)
            {
                return Err(RepositoryError::Conflict);
            }
            rows.push(application.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<ApplicationRecord>, RepositoryError> {
            Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn find_by_applicant(
            &self,
            applicant_id: Uuid,
        ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
            let mut rows: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.applicant_id == applicant_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
            Ok(rows)
        }

        async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<ApplicationRecord>, RepositoryError> {
            let mut rows: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.job_id == job_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
            Ok(rows)
        }

        async fn update_status(
            &self,
            id: Uuid,
            status: ApplicationStatus,
        ) -> Result<ApplicationRecord, RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(RepositoryError::NotFound)?;
            row.status = status;
            Ok(row.clone())
        }
    }

    struct MemoryJobs {
        rows: Vec<JobRecord>,
    }

    #[async_trait]
    impl JobStore for MemoryJobs {
        async fn find(&self, id: Uuid) -> Result<Option<JobRecord>, RepositoryError> {
            Ok(self.rows.iter().find(|j| j.id == id).cloned())
        }
    }

    struct MemoryUsers {
        rows: Vec<UserRecord>,
    }

    #[async_trait]
    impl UserDirectory for MemoryUsers {
        async fn find(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError> {
            Ok(self.rows.iter().find(|u| u.id == id).cloned())
        }
    }

    fn make_user(role: Role, resume: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: "hash".to_string(),
            phone: "555-0100".to_string(),
            location: "Remote".to_string(),
            skills: vec!["rust".to_string()],
            experience: 3,
            resume: resume.to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    fn make_job(employer_id: Uuid) -> JobRecord {
        JobRecord {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            description: "Build services".to_string(),
            requirements: vec![],
            location: "Berlin".to_string(),
            salary: "negotiable".to_string(),
            jobtype: JobType::FullTime,
            employer_id,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    struct Fixture {
        engine: ApplicationEngine,
        repo: Arc<MemoryApplications>,
    }

    fn fixture(jobs: Vec<JobRecord>, users: Vec<UserRecord>) -> Fixture {
        let repo = Arc::new(MemoryApplications::default());
        let engine = ApplicationEngine::new(
            repo.clone(),
            Arc::new(MemoryJobs { rows: jobs }),
            Arc::new(MemoryUsers { rows: users }),
        );
        Fixture { engine, repo }
    }

    #[tokio::test]
    async fn test_submit_succeeds_then_duplicate_conflicts() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let employer = make_user(Role::Employer, "");
        let job = make_job(employer.id);
        let f = fixture(vec![job.clone()], vec![seeker.clone(), employer]);

        let view = f
            .engine
            .submit(&seeker, job.id, Some("Hello".to_string()))
            .await
            .unwrap();
        assert_eq!(view.status, ApplicationStatus::Pending);
        assert_eq!(view.job.title, "Backend Engineer");
        assert_eq!(view.applicant.resume, "resumes/u/cv.pdf");

        let err = f.engine.submit(&seeker, job.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        // Exactly one record survives for the pair.
        assert_eq!(f.repo.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_employer_cannot_submit_even_with_resume() {
        let employer = make_user(Role::Employer, "resumes/e/cv.pdf");
        let job = make_job(employer.id);
        let f = fixture(vec![job.clone()], vec![employer.clone()]);

        let err = f.engine.submit(&employer, job.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::RoleForbidden(_)));
        assert!(f.repo.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_submit_without_resume_is_prerequisite_missing() {
        let seeker = make_user(Role::Jobseeker, "");
        let employer = make_user(Role::Employer, "");
        let job = make_job(employer.id);
        let f = fixture(vec![job.clone()], vec![seeker.clone(), employer]);

        let err = f.engine.submit(&seeker, job.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::PrerequisiteMissing(_)));
    }

    #[tokio::test]
    async fn test_submit_to_missing_job_is_not_found() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let f = fixture(vec![], vec![seeker.clone()]);

        let err = f
            .engine
            .submit(&seeker, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_detail_visible_to_applicant_and_owner_only() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let owner = make_user(Role::Employer, "");
        let other_seeker = make_user(Role::Jobseeker, "resumes/v/cv.pdf");
        let other_employer = make_user(Role::Employer, "");
        let job = make_job(owner.id);
        let f = fixture(
            vec![job.clone()],
            vec![
                seeker.clone(),
                owner.clone(),
                other_seeker.clone(),
                other_employer.clone(),
            ],
        );

        let submitted = f.engine.submit(&seeker, job.id, None).await.unwrap();

        let as_applicant = f.engine.detail(&seeker, submitted.id).await.unwrap();
        assert_eq!(as_applicant.applicant.email, seeker.email);
        assert_eq!(as_applicant.job.description, "Build services");

        f.engine.detail(&owner, submitted.id).await.unwrap();

        let err = f.engine.detail(&other_seeker, submitted.id).await.unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));
        let err = f
            .engine
            .detail(&other_employer, submitted.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn test_detail_of_missing_application_is_not_found() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let f = fixture(vec![], vec![seeker.clone()]);
        let err = f.engine.detail(&seeker, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_value_without_mutation() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let owner = make_user(Role::Employer, "");
        let job = make_job(owner.id);
        let f = fixture(vec![job.clone()], vec![seeker.clone(), owner.clone()]);
        let submitted = f.engine.submit(&seeker, job.id, None).await.unwrap();

        let err = f
            .engine
            .update_status(&owner, submitted.id, "shortlisted")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(f.repo.snapshot()[0].status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_status_role_checked_before_existence() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let f = fixture(vec![], vec![seeker.clone()]);

        // A jobseeker probing a random id gets the role error, not 404.
        let err = f
            .engine
            .update_status(&seeker, Uuid::new_v4(), "accepted")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoleForbidden(_)));
    }

    #[tokio::test]
    async fn test_update_status_ownership_and_effect() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let owner = make_user(Role::Employer, "");
        let intruder = make_user(Role::Employer, "");
        let job = make_job(owner.id);
        let f = fixture(
            vec![job.clone()],
            vec![seeker.clone(), owner.clone(), intruder.clone()],
        );
        let submitted = f.engine.submit(&seeker, job.id, None).await.unwrap();

        let err = f
            .engine
            .update_status(&intruder, submitted.id, "accepted")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));
        assert_eq!(f.repo.snapshot()[0].status, ApplicationStatus::Pending);

        let updated = f
            .engine
            .update_status(&owner, submitted.id, "accepted")
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Accepted);

        // Reflected in a subsequent detail read.
        let detail = f.engine.detail(&seeker, submitted.id).await.unwrap();
        assert_eq!(detail.status, ApplicationStatus::Accepted);
    }

    #[tokio::test]
    async fn test_list_for_applicant_is_newest_first_with_job_overview() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let owner = make_user(Role::Employer, "");
        let job_a = make_job(owner.id);
        let job_b = make_job(owner.id);
        let f = fixture(
            vec![job_a.clone(), job_b.clone()],
            vec![seeker.clone(), owner],
        );

        // Seed directly so the timestamps are distinct and deterministic.
        let now = Utc::now();
        for (job_id, age_minutes) in [(job_a.id, 10), (job_b.id, 5)] {
            f.repo
                .insert(&ApplicationRecord {
                    id: Uuid::new_v4(),
                    job_id,
                    applicant_id: seeker.id,
                    coverletter: String::new(),
                    status: ApplicationStatus::Pending,
                    applied_at: now - Duration::minutes(age_minutes),
                })
                .await
                .unwrap();
        }

        let listed = f.engine.list_for_applicant(&seeker).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].job.id, job_b.id);
        assert_eq!(listed[1].job.id, job_a.id);
        assert_eq!(listed[0].job.salary, "negotiable");
    }

    #[tokio::test]
    async fn test_list_for_job_scoped_to_job_and_gated() {
        let seeker_a = make_user(Role::Jobseeker, "resumes/a/cv.pdf");
        let seeker_b = make_user(Role::Jobseeker, "resumes/b/cv.pdf");
        let owner = make_user(Role::Employer, "");
        let other_employer = make_user(Role::Employer, "");
        let job = make_job(owner.id);
        let other_job = make_job(other_employer.id);
        let f = fixture(
            vec![job.clone(), other_job.clone()],
            vec![
                seeker_a.clone(),
                seeker_b.clone(),
                owner.clone(),
                other_employer.clone(),
            ],
        );

        let now = Utc::now();
        for (applicant, job_id, age) in [
            (&seeker_a, job.id, 30),
            (&seeker_b, job.id, 5),
            (&seeker_a, other_job.id, 1),
        ] {
            f.repo
                .insert(&ApplicationRecord {
                    id: Uuid::new_v4(),
                    job_id,
                    applicant_id: applicant.id,
                    coverletter: String::new(),
                    status: ApplicationStatus::Pending,
                    applied_at: now - Duration::minutes(age),
                })
                .await
                .unwrap();
        }

        let listed = f.engine.list_for_job(&owner, job.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].applicant.id, seeker_b.id);
        assert_eq!(listed[1].applicant.id, seeker_a.id);
        assert_eq!(listed[0].applicant.skills, vec!["rust".to_string()]);

        // Role gate fires before anything else for jobseekers.
        let err = f.engine.list_for_job(&seeker_a, job.id).await.unwrap_err();
        assert!(matches!(err, AppError::RoleForbidden(_)));
        // Right role, wrong owner.
        let err = f
            .engine
            .list_for_job(&other_employer, job.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));
        // Missing job for an employer is a 404.
        let err = f
            .engine
            .list_for_job(&owner, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_submissions_yield_one_success() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let owner = make_user(Role::Employer, "");
        let job = make_job(owner.id);
        let f = fixture(vec![job.clone()], vec![seeker.clone(), owner]);

        let (a, b) = tokio::join!(
            tokio::spawn({
                let engine = f.engine.clone();
                let seeker = seeker.clone();
                async move { engine.submit(&seeker, job.id, None).await }
            }),
            tokio::spawn({
                let engine = f.engine.clone();
                let seeker = seeker.clone();
                async move { engine.submit(&seeker, job.id, None).await }
            }),
        );
        let results = [a.unwrap(), b.unwrap()];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AppError::Conflict(_)))));
        assert_eq!(f.repo.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_status_updates_settle_on_one_submitted_value() {
        let seeker = make_user(Role::Jobseeker, "resumes/u/cv.pdf");
        let owner = make_user(Role::Employer, "");
        let job = make_job(owner.id);
        let f = fixture(vec![job.clone()], vec![seeker.clone(), owner.clone()]);
        let submitted = f.engine.submit(&seeker, job.id, None).await.unwrap();

        let (a, b) = tokio::join!(
            tokio::spawn({
                let engine = f.engine.clone();
                let owner = owner.clone();
                async move { engine.update_status(&owner, submitted.id, "accepted").await }
            }),
            tokio::spawn({
                let engine = f.engine.clone();
                let owner = owner.clone();
                async move { engine.update_status(&owner, submitted.id, "rejected").await }
            }),
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let status = f.repo.snapshot()[0].status;
        assert!(
            status == ApplicationStatus::Accepted || status == ApplicationStatus::Rejected,
            "unexpected final status {status:?}"
        );
    }
}
