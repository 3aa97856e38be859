use crate::dto::job_dto::{CreateJobPayload, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::models::job::Job;
use crate::models::verification::DocumentType;
use crate::services::storage_service::StorageService;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;
use validator::Validate;

#[derive(Clone)]
pub struct JobService {
    pool: SqlitePool,
    storage: StorageService,
}

impl JobService {
    pub fn new(pool: SqlitePool, storage: StorageService) -> Self {
        Self { pool, storage }
    }

    pub async fn create(&self, payload: CreateJobPayload) -> Result<Job> {
        payload.validate()?;
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
                (title, employment_type, location, department, description,
                 requirements, languages_required, deadline, posted_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(payload.title.trim())
        .bind(&payload.employment_type)
        .bind(&payload.location)
        .bind(&payload.department)
        .bind(&payload.description)
        .bind(&payload.requirements)
        .bind(&payload.languages_required)
        .bind(&payload.deadline)
        .bind(Utc::now().date_naive())
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn get(&self, id: i64) -> Result<Job> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY posted_date DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    /// Partial update: absent fields keep their current value.
    pub async fn update(&self, id: i64, payload: UpdateJobPayload) -> Result<Job> {
        let current = self.get(id).await?;
        if let Some(ref title) = payload.title {
            if title.trim().is_empty() {
                return Err(Error::BadRequest("title must not be empty".to_string()));
            }
        }
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET title = ?, employment_type = ?, location = ?, department = ?,
                description = ?, requirements = ?, languages_required = ?, deadline = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(
            payload
                .title
                .as_deref()
                .map(str::trim)
                .unwrap_or(current.title.as_str()),
        )
        .bind(payload.employment_type.or(current.employment_type))
        .bind(payload.location.or(current.location))
        .bind(payload.department.or(current.department))
        .bind(payload.description.or(current.description))
        .bind(payload.requirements.or(current.requirements))
        .bind(payload.languages_required.or(current.languages_required))
        .bind(payload.deadline.or(current.deadline))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    /// Deletes a job posting together with every application submitted for
    /// it, their files and their verification records. File removal is best
    /// effort.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.get(id).await?;

        let applications = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = ?",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        for app in &applications {
            for filename in app.attachment_files() {
                if let Err(e) = self.storage.delete_upload(filename).await {
                    warn!(application_id = app.id, file = filename, error = %e, "failed to delete attachment");
                }
            }
            if let Some(ref filename) = app.interview_invitation_pdf {
                if let Err(e) = self
                    .storage
                    .delete_document(DocumentType::InterviewInvitation, filename)
                    .await
                {
                    warn!(application_id = app.id, file = %filename, error = %e, "failed to delete convocation");
                }
            }
            if let Some(ref filename) = app.acceptance_letter_pdf {
                if let Err(e) = self
                    .storage
                    .delete_document(DocumentType::AcceptanceLetter, filename)
                    .await
                {
                    warn!(application_id = app.id, file = %filename, error = %e, "failed to delete acceptance letter");
                }
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            DELETE FROM document_verifications
            WHERE application_id IN (SELECT id FROM applications WHERE job_id = ?)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM applications WHERE job_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");
        crate::database::MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    fn payload() -> CreateJobPayload {
        CreateJobPayload {
            title: "Comptable".to_string(),
            employment_type: Some("CDI".to_string()),
            location: Some("Djibouti".to_string()),
            department: Some("Finance".to_string()),
            description: Some("Tenue de la comptabilité générale.".to_string()),
            requirements: Some("Bac+3 en comptabilité\n2 ans d'expérience".to_string()),
            languages_required: Some("Français, Anglais".to_string()),
            deadline: Some("2025-12-31".to_string()),
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrip() {
        let service = JobService::new(setup_test_db().await, StorageService::new("unused"));
        let job = service.create(payload()).await.expect("create");
        assert_eq!(job.title, "Comptable");
        assert_eq!(job.requirement_lines().len(), 2);

        let found = service.get(job.id).await.unwrap();
        assert_eq!(found.title, job.title);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let service = JobService::new(setup_test_db().await, StorageService::new("unused"));
        let mut p = payload();
        p.title = "".to_string();
        assert!(matches!(
            service.create(p).await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn update_keeps_absent_fields() {
        let service = JobService::new(setup_test_db().await, StorageService::new("unused"));
        let job = service.create(payload()).await.unwrap();

        let updated = service
            .update(
                job.id,
                UpdateJobPayload {
                    title: Some("Comptable senior".to_string()),
                    employment_type: None,
                    location: None,
                    department: None,
                    description: None,
                    requirements: None,
                    languages_required: None,
                    deadline: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Comptable senior");
        assert_eq!(updated.location.as_deref(), Some("Djibouti"));
    }

    #[tokio::test]
    async fn delete_cascades_to_applications() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let service = JobService::new(pool.clone(), StorageService::new(dir.path()));
        let job = service.create(payload()).await.unwrap();

        sqlx::query(
            r#"
            INSERT INTO applications (job_id, job_title, first_name, last_name, email, phone, submitted_at)
            VALUES (?, 'Comptable', 'Awa', 'Hassan', 'awa@example.com', '77121212', ?)
            "#,
        )
        .bind(job.id)
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            r#"
            INSERT INTO document_verifications
                (code, application_id, document_type, candidate_name, job_title,
                 issue_date, pdf_filename, created_at)
            VALUES ('ABCDEF0123456789', 1, 'interview_invitation', 'Awa Hassan',
                    'Comptable', '2025-10-01', 'x.pdf', ?)
            "#,
        )
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        service.delete(job.id).await.expect("delete");

        assert!(matches!(
            service.get(job.id).await.unwrap_err(),
            Error::NotFound(_)
        ));
        let apps = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(apps, 0);
        let codes = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM document_verifications")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(codes, 0);
    }
}
