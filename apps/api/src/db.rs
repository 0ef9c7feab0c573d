use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::config::Config;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");
    Ok(())
}

/// Creates the bootstrap admin account unless an admin with that email already exists.
pub async fn seed_default_admin(pool: &PgPool, config: &Config) -> Result<()> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND role = 'admin')",
    )
    .bind(&config.admin_email)
    .fetch_one(pool)
    .await?;

    if exists {
        return Ok(());
    }

    let password_hash = hash_password(&config.admin_password, config.bcrypt_cost)
        .await
        .context("Failed to hash default admin password")?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (first_name, last_name, email, password_hash, role)
        VALUES ('Admin', 'User', $1, $2, 'admin')
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(&config.admin_email)
    .bind(&password_hash)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        info!("Default admin user created ({})", config.admin_email);
    } else {
        warn!(
            "Default admin not created: {} is already registered as a non-admin user",
            config.admin_email
        );
    }
    Ok(())
}
