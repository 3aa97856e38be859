use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DocumentType {
    InterviewInvitation,
    AcceptanceLetter,
}

impl DocumentType {
    /// Storage collection the rendered file lives in.
    pub fn collection(&self) -> &'static str {
        match self {
            DocumentType::InterviewInvitation => "convocations",
            DocumentType::AcceptanceLetter => "acceptances",
        }
    }

    /// Human-facing filename label.
    pub fn filename_label(&self) -> &'static str {
        match self {
            DocumentType::InterviewInvitation => "Convocation_Entretien",
            DocumentType::AcceptanceLetter => "Lettre_Acceptation",
        }
    }

    /// Prefix of the footer reference string ({PREFIX}-{id}-{yyyymmdd}).
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            DocumentType::InterviewInvitation => "CONV",
            DocumentType::AcceptanceLetter => "ACCEPT",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::InterviewInvitation => "interview_invitation",
            DocumentType::AcceptanceLetter => "acceptance_letter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum VerificationStatus {
    Valid,
    Revoked,
}

/// Binds a verification code to a generated document. The code, not the PDF,
/// is the trust anchor: a printed copy can be checked against this record
/// without trusting the file itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VerificationRecord {
    pub id: i64,
    pub code: String,
    pub application_id: i64,
    pub document_type: DocumentType,
    pub candidate_name: String,
    pub job_title: String,
    pub issue_date: NaiveDate,
    pub pdf_filename: String,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}
