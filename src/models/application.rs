use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Coarse workflow marker: `phase1` while the screening decision is pending
/// or non-terminal, `completed` once any terminal decision has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Phase1,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Phase1Status {
    Pending,
    SelectedForInterview,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Phase2Status {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub country: Option<String>,
    pub photo: Option<String>,
    pub cv: Option<String>,
    pub cover_letter: Option<String>,
    pub id_card: Option<String>,
    pub recommendation_letter: Option<String>,
    pub criminal_record: Option<String>,
    pub diploma: Option<String>,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub workflow_phase: WorkflowPhase,
    pub phase1_status: Phase1Status,
    pub phase1_date: Option<DateTime<Utc>>,
    pub interview_date: Option<String>,
    pub interview_notes: Option<String>,
    pub phase2_status: Option<Phase2Status>,
    pub phase2_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub phase1_notification_sent: bool,
    pub phase2_notification_sent: bool,
    pub interview_invitation_pdf: Option<String>,
    pub acceptance_letter_pdf: Option<String>,
}

impl Application {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Candidate attachment filenames, used by the cascade delete.
    pub fn attachment_files(&self) -> Vec<&str> {
        [
            &self.photo,
            &self.cv,
            &self.cover_letter,
            &self.id_card,
            &self.recommendation_letter,
            &self.criminal_record,
            &self.diploma,
        ]
        .into_iter()
        .filter_map(|f| f.as_deref())
        .filter(|f| !f.is_empty())
        .collect()
    }
}
