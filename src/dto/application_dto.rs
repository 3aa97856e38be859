use crate::services::workflow_service::{Phase1Decision, Phase2Decision};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApplicationPayload {
    /// Omitted or 0 for a spontaneous application.
    pub job_id: Option<i64>,
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone must not be empty"))]
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
}

#[derive(Debug, Clone, Deserialize)]
pub struct Phase1DecisionPayload {
    pub decision: Phase1Decision,
    /// Required when the decision is `selected_for_interview`.
    pub interview_date: Option<String>,
    /// Required when the decision is `rejected`.
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Phase2DecisionPayload {
    pub decision: Phase2Decision,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InterviewNotesPayload {
    #[validate(length(min = 1, message = "notes must not be empty"))]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub total_jobs: i64,
    pub total_applications: i64,
    pub pending_applications: i64,
    pub accepted_applications: i64,
    pub rejected_applications: i64,
}
