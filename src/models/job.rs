use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub employment_type: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    /// Newline-separated list, split at the API boundary.
    pub requirements: Option<String>,
    pub languages_required: Option<String>,
    pub deadline: Option<String>,
    pub posted_date: NaiveDate,
}

impl Job {
    pub fn requirement_lines(&self) -> Vec<String> {
        self.requirements
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}
