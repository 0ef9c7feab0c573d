use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const JOB_TYPES: &[&str] = &[
    "Developer",
    "Designer",
    "Marketing",
    "Engineer",
    "Architect",
    "Manager",
];

pub const EMPLOYMENT_TYPES: &[&str] = &["Full-time", "Part-time", "Contract", "Freelance"];

pub const SENIORITY_LEVELS: &[&str] = &["Intern", "Junior", "Mid-Level", "Senior"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub job_type: String,
    pub employment_type: String,
    pub seniority_level: String,
    pub location: String,
    pub is_remote: bool,
    pub salary: i32,
    pub description: String,
    pub image_url: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
}

/// Job plus the name of the admin who posted it (admin listing).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobWithCreator {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
