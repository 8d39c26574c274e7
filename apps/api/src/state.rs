use std::sync::Arc;

use crate::applications::engine::ApplicationEngine;
use crate::config::Config;
use crate::jobs::store::PgJobStore;
use crate::users::resume::ResumeStore;
use crate::users::store::PgUserStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Storage handles are constructed once at startup and passed
/// in explicitly; nothing here is process-global.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<PgUserStore>,
    pub jobs: Arc<PgJobStore>,
    pub applications: ApplicationEngine,
    pub resumes: ResumeStore,
}
