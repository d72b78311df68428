use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub is_completed: bool,
    pub cover_letter_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CoverLetter {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub title: String,
    pub content: String,
    pub token_usage: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OptimizedResume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    /// Normalized `ResumeDocument` JSON.
    pub content: String,
    pub original_resume: String,
    pub job_description: String,
    pub created_at: DateTime<Utc>,
}

/// Fields a user supplies when creating a job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobInput {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
}

/// Fields a user supplies when updating a job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobUpdate {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone)]
pub struct NewCoverLetter {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub title: String,
    pub content: String,
    pub token_usage: i32,
}

#[derive(Debug, Clone)]
pub struct NewOptimizedResume {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub content: String,
    pub original_resume: String,
    pub job_description: String,
}
