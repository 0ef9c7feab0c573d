use serde::Deserialize;

use crate::auth::password::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
}

#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Profile changes after validation. `None` names keep the stored value.
#[derive(Debug)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, AppError> {
        let first_name = required("firstName", self.first_name)?;
        check_length("firstName", &first_name, 2, Some(50))?;
        let last_name = required("lastName", self.last_name)?;
        check_length("lastName", &last_name, 2, Some(50))?;
        let email = normalize_email(required("email", self.email)?)?;

        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("\"password\" is required".to_string()))?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "\"password\" length must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "\"password\" length must be less than or equal to {MAX_PASSWORD_LENGTH} bytes"
            )));
        }

        Ok(NewUser {
            first_name,
            last_name,
            email,
            password,
        })
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<Credentials, AppError> {
        let email = normalize_email(required("email", self.email)?)?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("\"password\" is required".to_string()))?;
        Ok(Credentials { email, password })
    }
}

impl ProfileRequest {
    pub fn validate(self) -> Result<ProfileUpdate, AppError> {
        let first_name = optional(self.first_name);
        if let Some(name) = &first_name {
            check_length("firstName", name, 2, Some(50))?;
        }
        let last_name = optional(self.last_name);
        if let Some(name) = &last_name {
            check_length("lastName", name, 2, Some(50))?;
        }
        let phone = optional(self.phone);
        if let Some(phone) = &phone {
            check_length("phone", phone, 1, Some(30))?;
        }
        let location = optional(self.location);
        if let Some(location) = &location {
            check_length("location", location, 1, Some(100))?;
        }

        Ok(ProfileUpdate {
            first_name,
            last_name,
            phone,
            location,
            bio: optional(self.bio),
            experience: optional(self.experience),
            skills: optional(self.skills),
        })
    }
}

/// Trims the value and rejects it when missing or blank.
pub fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    optional(value).ok_or_else(|| AppError::Validation(format!("\"{field}\" is required")))
}

/// Trims the value, mapping blank strings to `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Character-count bounds check with a client-facing message.
pub fn check_length(field: &str, value: &str, min: usize, max: Option<usize>) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < min {
        return Err(AppError::Validation(format!(
            "\"{field}\" length must be at least {min} characters long"
        )));
    }
    if let Some(max) = max {
        if len > max {
            return Err(AppError::Validation(format!(
                "\"{field}\" length must be less than or equal to {max} characters long"
            )));
        }
    }
    Ok(())
}

fn normalize_email(email: String) -> Result<String, AppError> {
    let email = email.to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::Validation(
            "\"email\" must be a valid email".to_string(),
        ));
    }
    Ok(email)
}

/// Structural email check: `local@domain.tld`, no whitespace, at most 100 chars.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 100 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}
