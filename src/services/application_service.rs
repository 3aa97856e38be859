use crate::dto::application_dto::{CreateApplicationPayload, StatsResponse};
use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::services::storage_service::StorageService;
use crate::services::verification_service::VerificationService;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;
use validator::Validate;

/// Job title applications carry when submitted without a job posting.
pub const SPONTANEOUS_JOB_TITLE: &str = "Candidature spontanée";

#[derive(Clone)]
pub struct ApplicationService {
    pool: SqlitePool,
    storage: StorageService,
}

impl ApplicationService {
    pub fn new(pool: SqlitePool, storage: StorageService) -> Self {
        Self { pool, storage }
    }

    /// Creates an application in its initial workflow state. The job title
    /// is denormalized at submission time so it survives job deletion.
    pub async fn create(&self, payload: CreateApplicationPayload) -> Result<Application> {
        payload.validate()?;

        let job_id = payload.job_id.unwrap_or(0);
        let job_title = if job_id > 0 {
            sqlx::query_scalar::<_, String>("SELECT title FROM jobs WHERE id = ?")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Job {} not found", job_id)))?
        } else {
            SPONTANEOUS_JOB_TITLE.to_string()
        };

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications
                (job_id, job_title, first_name, last_name, email, phone, address, country,
                 photo, cv, cover_letter, id_card, recommendation_letter, criminal_record,
                 diploma, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(&job_title)
        .bind(payload.first_name.trim())
        .bind(payload.last_name.trim())
        .bind(payload.email.trim())
        .bind(payload.phone.trim())
        .bind(&payload.address)
        .bind(&payload.country)
        .bind(&payload.photo)
        .bind(&payload.cv)
        .bind(&payload.cover_letter)
        .bind(&payload.id_card)
        .bind(&payload.recommendation_letter)
        .bind(&payload.criminal_record)
        .bind(&payload.diploma)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(application)
    }

    pub async fn get(&self, id: i64) -> Result<Application> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications ORDER BY submitted_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    pub async fn list_by_job(&self, job_id: i64) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = ? ORDER BY submitted_at DESC, id DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    /// Deletes an application with its verification records, uploaded
    /// attachments and generated documents. File removal is best effort; a
    /// missing or locked file never blocks the database cascade.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let app = self.get(id).await?;

        for filename in app.attachment_files() {
            if let Err(e) = self.storage.delete_upload(filename).await {
                warn!(application_id = id, file = filename, error = %e, "failed to delete attachment");
            }
        }
        use crate::models::verification::DocumentType;
        if let Some(ref filename) = app.interview_invitation_pdf {
            if let Err(e) = self
                .storage
                .delete_document(DocumentType::InterviewInvitation, filename)
                .await
            {
                warn!(application_id = id, file = %filename, error = %e, "failed to delete convocation");
            }
        }
        if let Some(ref filename) = app.acceptance_letter_pdf {
            if let Err(e) = self
                .storage
                .delete_document(DocumentType::AcceptanceLetter, filename)
                .await
            {
                warn!(application_id = id, file = %filename, error = %e, "failed to delete acceptance letter");
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM document_verifications WHERE application_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM applications WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Dashboard counters. Status strings are the coarse candidate-facing
    /// ones, not the per-phase columns.
    pub async fn stats(&self) -> Result<StatsResponse> {
        let total_jobs = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await?;
        let total_applications = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications")
            .fetch_one(&self.pool)
            .await?;
        let count_status = |status: &'static str| {
            let pool = self.pool.clone();
            async move {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications WHERE status = ?")
                    .bind(status)
                    .fetch_one(&pool)
                    .await
            }
        };
        Ok(StatsResponse {
            total_jobs,
            total_applications,
            pending_applications: count_status("pending").await?,
            accepted_applications: count_status("accepted").await?,
            rejected_applications: count_status("rejected").await?,
        })
    }

    /// Verification records issued for this application, newest first.
    pub async fn verification_history(
        &self,
        verification: &VerificationService,
        id: i64,
    ) -> Result<Vec<crate::models::verification::VerificationRecord>> {
        self.get(id).await?;
        verification.list_for_application(id).await
    }
}
