use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub employment_type: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    /// One requirement per line.
    pub requirements: Option<String>,
    pub languages_required: Option<String>,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateJobPayload {
    pub title: Option<String>,
    pub employment_type: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub languages_required: Option<String>,
    pub deadline: Option<String>,
}
