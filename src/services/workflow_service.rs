use crate::error::{Error, Result};
use crate::models::application::{Application, Phase1Status, Phase2Status, WorkflowPhase};
use crate::models::verification::DocumentType;
use crate::services::document_service::{CandidateDetails, DocumentService};
use crate::services::storage_service::StorageService;
use crate::services::verification_service::VerificationService;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase1Decision {
    SelectedForInterview,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase2Decision {
    Accepted,
    Rejected,
}

/// Drives the two-phase hiring workflow.
///
/// Transitions are guarded UPDATE statements: the precondition columns are
/// repeated in the WHERE clause, so a raced or repeated decision affects zero
/// rows and is reported as a conflict instead of silently overwriting.
///
/// Document generation is deliberately decoupled from the transition: the
/// state change commits first, then `ensure_*` runs best-effort and can be
/// retried later. An empty pdf column on the application signals that a
/// retry is needed.
#[derive(Clone)]
pub struct WorkflowService {
    pool: SqlitePool,
    verification: VerificationService,
    documents: DocumentService,
    storage: StorageService,
    base_url: String,
    render_timeout: Duration,
}

impl WorkflowService {
    pub fn new(
        pool: SqlitePool,
        verification: VerificationService,
        documents: DocumentService,
        storage: StorageService,
        base_url: String,
        render_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            verification,
            documents,
            storage,
            base_url,
            render_timeout,
        }
    }

    pub async fn application(&self, id: i64) -> Result<Application> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    pub async fn decide_phase1(
        &self,
        id: i64,
        decision: Phase1Decision,
        interview_date: Option<&str>,
        rejection_reason: Option<&str>,
    ) -> Result<Application> {
        let app = self.application(id).await?;
        if app.workflow_phase == WorkflowPhase::Completed
            || app.phase1_status != Phase1Status::Pending
        {
            return Err(Error::BadRequest(format!(
                "Application {} already has a phase 1 decision",
                id
            )));
        }

        let now = Utc::now();
        match decision {
            Phase1Decision::SelectedForInterview => {
                let interview_date = interview_date
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        Error::BadRequest(
                            "interview_date is required when selecting for interview".to_string(),
                        )
                    })?;

                let result = sqlx::query(
                    r#"
                    UPDATE applications
                    SET phase1_status = 'selected_for_interview',
                        phase1_date = ?,
                        interview_date = ?,
                        status = 'interview scheduled'
                    WHERE id = ? AND phase1_status = 'pending' AND workflow_phase = 'phase1'
                    "#,
                )
                .bind(now)
                .bind(interview_date)
                .bind(id)
                .execute(&self.pool)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(Error::BadRequest(format!(
                        "Application {} was decided concurrently",
                        id
                    )));
                }

                // Best effort: the committed transition is authoritative, the
                // document can be regenerated later.
                if let Err(e) = self.ensure_interview_invitation(id).await {
                    error!(
                        application_id = id,
                        error = %e,
                        "interview invitation generation failed; transition kept"
                    );
                }
            }
            Phase1Decision::Rejected => {
                let reason = rejection_reason
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        Error::BadRequest("rejection_reason is required when rejecting".to_string())
                    })?;

                let result = sqlx::query(
                    r#"
                    UPDATE applications
                    SET phase1_status = 'rejected',
                        phase1_date = ?,
                        rejection_reason = ?,
                        workflow_phase = 'completed',
                        status = 'rejected'
                    WHERE id = ? AND phase1_status = 'pending' AND workflow_phase = 'phase1'
                    "#,
                )
                .bind(now)
                .bind(reason)
                .bind(id)
                .execute(&self.pool)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(Error::BadRequest(format!(
                        "Application {} was decided concurrently",
                        id
                    )));
                }
            }
        }

        self.application(id).await
    }

    pub async fn decide_phase2(
        &self,
        id: i64,
        decision: Phase2Decision,
        rejection_reason: Option<&str>,
    ) -> Result<Application> {
        let app = self.application(id).await?;
        if app.phase1_status != Phase1Status::SelectedForInterview {
            return Err(Error::BadRequest(format!(
                "Application {} has not been selected for interview",
                id
            )));
        }
        if app.workflow_phase == WorkflowPhase::Completed || app.phase2_status.is_some() {
            return Err(Error::BadRequest(format!(
                "Application {} already has a phase 2 decision",
                id
            )));
        }

        let now = Utc::now();
        let result = match decision {
            Phase2Decision::Accepted => {
                sqlx::query(
                    r#"
                    UPDATE applications
                    SET phase2_status = 'accepted',
                        phase2_date = ?,
                        workflow_phase = 'completed',
                        status = 'accepted'
                    WHERE id = ? AND phase1_status = 'selected_for_interview'
                      AND workflow_phase = 'phase1' AND phase2_status IS NULL
                    "#,
                )
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            Phase2Decision::Rejected => {
                let reason = rejection_reason
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        Error::BadRequest("rejection_reason is required when rejecting".to_string())
                    })?;
                sqlx::query(
                    r#"
                    UPDATE applications
                    SET phase2_status = 'rejected',
                        phase2_date = ?,
                        rejection_reason = ?,
                        workflow_phase = 'completed',
                        status = 'rejected'
                    WHERE id = ? AND phase1_status = 'selected_for_interview'
                      AND workflow_phase = 'phase1' AND phase2_status IS NULL
                    "#,
                )
                .bind(now)
                .bind(reason)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
        };
        if result.rows_affected() == 0 {
            return Err(Error::BadRequest(format!(
                "Application {} was decided concurrently",
                id
            )));
        }

        self.application(id).await
    }

    /// Generates (or regenerates) the interview convocation for an
    /// application already selected for interview. Returns the stored
    /// filename. Each call issues a fresh verification code; the newest
    /// issuance supersedes older ones without revoking them.
    pub async fn ensure_interview_invitation(&self, id: i64) -> Result<String> {
        let app = self.application(id).await?;
        if app.phase1_status != Phase1Status::SelectedForInterview {
            return Err(Error::BadRequest(format!(
                "Application {} is not selected for interview",
                id
            )));
        }
        let interview_date = app.interview_date.clone().ok_or_else(|| {
            Error::BadRequest(format!("Application {} has no interview date", id))
        })?;
        let details = CandidateDetails::from_application(&app)?;

        let now = Utc::now();
        let filename = StorageService::document_filename(
            DocumentType::InterviewInvitation,
            &app.full_name(),
            app.id,
            &now,
        );
        let record = self
            .verification
            .issue(
                app.id,
                DocumentType::InterviewInvitation,
                &app.full_name(),
                &app.job_title,
                now.date_naive(),
                &filename,
            )
            .await?;

        let documents = self.documents.clone();
        let base_url = self.base_url.clone();
        let code = record.code.clone();
        let bytes = self
            .render_with_timeout(move || {
                documents.render_interview_invitation(
                    &details,
                    &interview_date,
                    Some(&code),
                    &base_url,
                )
            })
            .await?;

        self.storage
            .store_document(DocumentType::InterviewInvitation, &filename, &bytes)
            .await?;
        sqlx::query("UPDATE applications SET interview_invitation_pdf = ? WHERE id = ?")
            .bind(&filename)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(filename)
    }

    /// Generates (or regenerates) the acceptance letter. Invoked by the
    /// route layer after a phase 2 acceptance, never inside the transition.
    pub async fn ensure_acceptance_letter(&self, id: i64) -> Result<String> {
        let app = self.application(id).await?;
        if app.phase2_status != Some(Phase2Status::Accepted) {
            return Err(Error::BadRequest(format!(
                "Application {} has not been accepted",
                id
            )));
        }
        let details = CandidateDetails::from_application(&app)?;

        let now = Utc::now();
        let filename = StorageService::document_filename(
            DocumentType::AcceptanceLetter,
            &app.full_name(),
            app.id,
            &now,
        );
        let record = self
            .verification
            .issue(
                app.id,
                DocumentType::AcceptanceLetter,
                &app.full_name(),
                &app.job_title,
                now.date_naive(),
                &filename,
            )
            .await?;

        let documents = self.documents.clone();
        let base_url = self.base_url.clone();
        let code = record.code.clone();
        let bytes = self
            .render_with_timeout(move || {
                documents.render_acceptance_letter(&details, Some(&code), &base_url)
            })
            .await?;

        self.storage
            .store_document(DocumentType::AcceptanceLetter, &filename, &bytes)
            .await?;
        sqlx::query("UPDATE applications SET acceptance_letter_pdf = ? WHERE id = ?")
            .bind(&filename)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(filename)
    }

    /// Idempotent notification flag. No transition implications.
    pub async fn mark_notification_sent(&self, id: i64, phase: u8) -> Result<()> {
        self.application(id).await?;
        let column = match phase {
            1 => "phase1_notification_sent",
            2 => "phase2_notification_sent",
            other => {
                return Err(Error::BadRequest(format!(
                    "Unknown workflow phase: {}",
                    other
                )))
            }
        };
        sqlx::query(&format!(
            "UPDATE applications SET {} = 1 WHERE id = ?",
            column
        ))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn add_interview_notes(&self, id: i64, notes: &str) -> Result<()> {
        self.application(id).await?;
        sqlx::query("UPDATE applications SET interview_notes = ? WHERE id = ?")
            .bind(notes)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Rendering is blocking (font parsing, layout, compression); run it off
    /// the async runtime with a bounded timeout. Expiry counts as a render
    /// failure and falls under the best-effort policy of the caller.
    async fn render_with_timeout<F>(&self, render: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Result<Vec<u8>> + Send + 'static,
    {
        match tokio::time::timeout(self.render_timeout, tokio::task::spawn_blocking(render)).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(Error::Render(format!("render task failed: {}", join_err))),
            Err(_) => Err(Error::Render(format!(
                "rendering timed out after {:?}",
                self.render_timeout
            ))),
        }
    }
}
