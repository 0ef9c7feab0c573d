use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::info;

use crate::auth::extractor::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::validation::{LoginRequest, ProfileRequest, RegisterRequest};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::user::User;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: &'static str,
    pub user: User,
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let new_user = req.validate()?;

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(&new_user.email)
        .fetch_one(&state.db)
        .await?;
    if taken {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&new_user.password, state.config.bcrypt_cost).await?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (first_name, last_name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(&new_user.email)
    .bind(&password_hash)
    .fetch_one(&state.db)
    .await
    .map_err(|e| match AppError::from(e) {
        err if err.is_unique_violation() => AppError::Conflict("Email already exists".to_string()),
        err => err,
    })?;

    let token = state.tokens.issue(user.id, &user.email).map_err(anyhow::Error::from)?;
    info!("Registered user {} ({})", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered",
            token,
            user,
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let credentials = req.validate()?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&credentials.email)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(|| AppError::Validation(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&credentials.password, &user.password_hash).await? {
        return Err(AppError::Validation(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.tokens.issue(user.id, &user.email).map_err(anyhow::Error::from)?;
    info!("User {} logged in", user.id);

    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user,
    }))
}

/// GET /api/auth/me
pub async fn handle_me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

/// PUT /api/auth/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    AppJson(req): AppJson<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let update = req.validate()?;

    let user: Option<User> = sqlx::query_as(
        r#"
        UPDATE users SET
            first_name = COALESCE($1, first_name),
            last_name  = COALESCE($2, last_name),
            phone      = $3,
            location   = $4,
            bio        = $5,
            experience = $6,
            skills     = $7,
            updated_at = NOW()
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.phone)
    .bind(&update.location)
    .bind(&update.bio)
    .bind(&update.experience)
    .bind(&update.skills)
    .bind(current.id)
    .fetch_optional(&state.db)
    .await?;

    let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    info!("Updated profile for user {}", user.id);

    Ok(Json(ProfileResponse {
        message: "Profile updated successfully",
        user,
    }))
}
