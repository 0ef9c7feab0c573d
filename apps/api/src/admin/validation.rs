use serde::Deserialize;

use crate::auth::validation::{check_length, optional, required};
use crate::errors::AppError;
use crate::models::job::{EMPLOYMENT_TYPES, JOB_TYPES, SENIORITY_LEVELS};
use crate::uploads::{stored_name, PUBLIC_PREFIX};

/// Job create/update body as posted by the admin panel.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    pub title: Option<String>,
    pub company: Option<String>,
    pub job_type: Option<String>,
    pub employment_type: Option<String>,
    pub seniority_level: Option<String>,
    pub location: Option<String>,
    pub is_remote: Option<bool>,
    pub salary: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A validated job, ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub struct JobInput {
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
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

impl JobPayload {
    pub fn validate(self) -> Result<JobInput, AppError> {
        let title = required("title", self.title)?;
        check_length("title", &title, 2, Some(200))?;
        let company = required("company", self.company)?;
        check_length("company", &company, 2, Some(100))?;
        let job_type = one_of("jobType", self.job_type, JOB_TYPES)?;
        let employment_type = one_of("employmentType", self.employment_type, EMPLOYMENT_TYPES)?;
        let seniority_level = one_of("seniorityLevel", self.seniority_level, SENIORITY_LEVELS)?;
        let location = required("location", self.location)?;
        check_length("location", &location, 2, Some(100))?;

        let salary = self
            .salary
            .ok_or_else(|| AppError::Validation("\"salary\" is required".to_string()))?;
        // Stored as a whole number, so the rounded value is what must be positive.
        let salary = salary.round();
        if !salary.is_finite() || salary < 1.0 {
            return Err(AppError::Validation(
                "\"salary\" must be a positive number".to_string(),
            ));
        }
        if salary > i32::MAX as f64 {
            return Err(AppError::Validation("\"salary\" is too large".to_string()));
        }

        let description = required("description", self.description)?;
        check_length("description", &description, 10, None)?;

        let image_url = optional(self.image_url);
        if let Some(url) = &image_url {
            if !is_acceptable_image_url(url) {
                return Err(AppError::Validation(
                    "\"imageUrl\" must be a valid uri".to_string(),
                ));
            }
        }

        Ok(JobInput {
            title,
            company,
            job_type,
            employment_type,
            seniority_level,
            location,
            is_remote: self.is_remote.unwrap_or(false),
            salary: salary as i32,
            description,
            image_url,
        })
    }
}

fn one_of(field: &str, value: Option<String>, allowed: &[&str]) -> Result<String, AppError> {
    let value = required(field, value)?;
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(AppError::Validation(format!(
            "\"{field}\" must be one of [{}]",
            allowed.join(", ")
        )))
    }
}

/// Absolute URI (`scheme:rest`) or a path to a file we serve under `/uploads/`.
fn is_acceptable_image_url(url: &str) -> bool {
    if url.chars().any(char::is_whitespace) {
        return false;
    }
    if url.starts_with(PUBLIC_PREFIX) {
        return stored_name(url).is_some();
    }
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    scheme_ok && !rest.is_empty()
}
