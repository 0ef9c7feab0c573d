use anyhow::{Context, Result};

/// Minimum accepted password length for new accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length (bcrypt only reads the first 72 bytes).
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Hashes a password with bcrypt on the blocking thread pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("bcrypt hashing failed")
}

/// Checks a password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch rather than an error so that
/// login always answers with the same message.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Password verification task failed")?;
    Ok(verified.unwrap_or(false))
}
