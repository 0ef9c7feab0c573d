use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub cv_path: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// An applicant's own application with the job it targets.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MyApplication {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub salary: i32,
    pub company_logo: Option<String>,
}

/// Application with applicant account and job details (admin listing).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub first_name: String,
    pub last_name: String,
    pub user_email: String,
    pub job_title: String,
    pub company: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(
            ApplicationStatus::parse("accepted"),
            Some(ApplicationStatus::Accepted)
        );
        assert_eq!(ApplicationStatus::parse("withdrawn"), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_value(ApplicationStatus::Rejected).unwrap();
        assert_eq!(json, "rejected");
    }
}
