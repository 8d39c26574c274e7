mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod routes;
mod state;
mod users;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::applications::engine::ApplicationEngine;
use crate::applications::repository::PgApplicationRepository;
use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::store::PgJobStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::users::resume::ResumeStore;
use crate::users::store::PgUserStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job portal API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO for résumé blobs
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Storage handles, constructed once and handed to the engine explicitly
    let users = Arc::new(PgUserStore::new(pool.clone()));
    let jobs = Arc::new(PgJobStore::new(pool.clone()));
    let repo = Arc::new(PgApplicationRepository::new(pool.clone()));
    let applications = ApplicationEngine::new(repo, jobs.clone(), users.clone());
    let resumes = ResumeStore::new(s3, config.s3_bucket.clone());

    let state = AppState {
        config: config.clone(),
        users,
        jobs,
        applications,
        resumes,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown signal handler: {e}");
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "jobportal-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
