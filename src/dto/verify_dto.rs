use crate::models::verification::{VerificationRecord, VerificationStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// Public verification result. `status` is `valid`, `revoked` or `invalid`;
/// document metadata is only present for codes that exist.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
}

impl VerifyResponse {
    pub fn invalid() -> Self {
        Self {
            status: "invalid",
            document_type: None,
            candidate_name: None,
            job_title: None,
            issue_date: None,
        }
    }

    pub fn from_record(record: VerificationRecord) -> Self {
        let status = match record.status {
            VerificationStatus::Valid => "valid",
            VerificationStatus::Revoked => "revoked",
        };
        Self {
            status,
            document_type: Some(record.document_type.as_str().to_string()),
            candidate_name: Some(record.candidate_name),
            job_title: Some(record.job_title),
            issue_date: Some(record.issue_date),
        }
    }
}
