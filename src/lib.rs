pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::services::{
    application_service::ApplicationService, document_service::DocumentService,
    employee_service::EmployeeService, job_service::JobService, storage_service::StorageService,
    verification_service::VerificationService, workflow_service::WorkflowService,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub application_service: ApplicationService,
    pub job_service: JobService,
    pub employee_service: EmployeeService,
    pub verification_service: VerificationService,
    pub workflow_service: WorkflowService,
    pub storage_service: StorageService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        let storage_service = StorageService::new(&config.storage_root);
        let verification_service = VerificationService::new(pool.clone());
        let document_service = DocumentService::new(&config.fonts_dir, &config.logo_path);
        let application_service = ApplicationService::new(pool.clone(), storage_service.clone());
        let job_service = JobService::new(pool.clone(), storage_service.clone());
        let employee_service = EmployeeService::new(pool.clone());
        let workflow_service = WorkflowService::new(
            pool.clone(),
            verification_service.clone(),
            document_service,
            storage_service.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.render_timeout_secs),
        );

        Self {
            pool,
            application_service,
            job_service,
            employee_service,
            verification_service,
            workflow_service,
            storage_service,
        }
    }
}

/// Everything except the outer tower layers and static file serving, so
/// integration tests can drive the exact production routing table.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/verify/:code", get(routes::verify::verify_code))
        .route(
            "/api/jobs",
            get(routes::jobs::list_jobs).post(routes::jobs::create_job),
        )
        .route(
            "/api/jobs/:id",
            get(routes::jobs::get_job)
                .put(routes::jobs::update_job)
                .delete(routes::jobs::delete_job),
        )
        .route(
            "/api/jobs/:id/applications",
            get(routes::jobs::list_job_applications),
        )
        .route(
            "/api/applications",
            get(routes::applications::list_applications)
                .post(routes::applications::create_application),
        )
        .route(
            "/api/applications/:id",
            get(routes::applications::get_application)
                .delete(routes::applications::delete_application),
        )
        .route(
            "/api/applications/:id/phase1",
            post(routes::applications::phase1_decision),
        )
        .route(
            "/api/applications/:id/phase2",
            post(routes::applications::phase2_decision),
        )
        .route(
            "/api/applications/:id/documents/interview-invitation",
            post(routes::applications::regenerate_convocation),
        )
        .route(
            "/api/applications/:id/documents/acceptance-letter",
            post(routes::applications::regenerate_acceptance_letter),
        )
        .route(
            "/api/applications/:id/notifications/:phase",
            post(routes::applications::mark_notification_sent),
        )
        .route(
            "/api/applications/:id/interview-notes",
            put(routes::applications::add_interview_notes),
        )
        .route(
            "/api/applications/:id/verifications",
            get(routes::applications::list_verifications),
        )
        .route("/api/stats", get(routes::applications::stats))
        .route(
            "/api/employees",
            get(routes::employees::list_employees).post(routes::employees::create_employee),
        )
        .route(
            "/api/employees/:id",
            get(routes::employees::get_employee)
                .put(routes::employees::update_employee)
                .delete(routes::employees::delete_employee),
        )
        .route(
            "/api/employees/:id/password",
            put(routes::employees::update_password),
        )
        .route(
            "/api/employees/:id/toggle-status",
            post(routes::employees::toggle_status),
        )
        .with_state(state)
}
