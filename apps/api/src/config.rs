use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Duration;

use crate::auth::validation::is_valid_email;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub bcrypt_cost: u32,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub admin_email: String,
    pub admin_password: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let jwt_expire = optional_env("JWT_EXPIRE", "7d");

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_ttl: parse_duration(&jwt_expire)
                .with_context(|| format!("JWT_EXPIRE '{jwt_expire}' is not a valid duration"))?,
            bcrypt_cost: parse_env("BCRYPT_COST", 10)?,
            upload_dir: PathBuf::from(optional_env("UPLOAD_DIR", "uploads")),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            admin_email: normalize_admin_email(&optional_env(
                "ADMIN_EMAIL",
                "admin@jobseeker.com",
            ))?,
            admin_password: optional_env("ADMIN_PASSWORD", "admin123"),
            port: parse_env("PORT", 4000)?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Stored lowercased, the same form login looks addresses up by.
fn normalize_admin_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        bail!("ADMIN_EMAIL '{raw}' is not a valid email address");
    }
    Ok(email)
}

/// Parses token lifetimes such as `7d`, `12h`, `30m`, `45s` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("duration is empty");
    }

    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let amount: i64 = digits
        .parse()
        .with_context(|| format!("'{raw}' does not start with a number"))?;
    if amount <= 0 {
        bail!("duration must be positive");
    }

    let duration = match unit.trim() {
        "s" => Duration::seconds(amount),
        "m" => Duration::minutes(amount),
        "h" => Duration::hours(amount),
        "d" => Duration::days(amount),
        "w" => Duration::weeks(amount),
        other => bail!("unknown duration unit '{other}'"),
    };
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_duration("7d").unwrap(), Duration::days(7));
    }

    #[test]
    fn test_parse_hours_and_minutes() {
        assert_eq!(parse_duration("12h").unwrap(), Duration::hours(12));
        assert_eq!(parse_duration("30m").unwrap(), Duration::minutes(30));
    }

    #[test]
    fn test_bare_number_is_seconds() {
        assert_eq!(parse_duration("3600").unwrap(), Duration::seconds(3600));
    }

    #[test]
    fn test_rejects_unknown_unit() {
        assert!(parse_duration("5y").is_err());
    }

    #[test]
    fn test_admin_email_is_lowercased() {
        assert_eq!(
            normalize_admin_email("  Admin@JobSeeker.COM ").unwrap(),
            "admin@jobseeker.com"
        );
    }

    #[test]
    fn test_admin_email_must_be_valid() {
        assert!(normalize_admin_email("not-an-email").is_err());
        assert!(normalize_admin_email("").is_err());
    }

    #[test]
    fn test_rejects_empty_and_zero() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("0d").is_err());
        assert!(parse_duration("d").is_err());
    }
}
