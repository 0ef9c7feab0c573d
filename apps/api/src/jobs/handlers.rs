//! Axum route handlers for the public Jobs API and a user's own applications.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::validation::is_valid_email;
use crate::errors::AppError;
use crate::extract::{AppPath, AppQuery};
use crate::jobs::filter::{JobSearchQuery, Pagination};
use crate::models::application::MyApplication;
use crate::models::job::Job;
use crate::state::AppState;
use crate::uploads::form::read_form;
use crate::uploads::UploadKind;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponse {
    pub message: &'static str,
    pub application_id: Uuid,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<JobSearchQuery>,
) -> Result<Json<JobListResponse>, AppError> {
    let (filter, page) = query.into_parts()?;

    let jobs: Vec<Job> = filter
        .select_query(page)
        .build_query_as::<Job>()
        .fetch_all(&state.db)
        .await?;

    let total_jobs: i64 = filter
        .count_query()
        .build_query_scalar::<i64>()
        .fetch_one(&state.db)
        .await?;

    Ok(Json(JobListResponse {
        jobs,
        pagination: Pagination::new(page, total_jobs),
    }))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Job>, AppError> {
    let job: Option<Job> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1 AND is_active = TRUE")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    job.map(Json)
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

/// GET /api/jobs/applications/my
pub async fn handle_my_applications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<MyApplication>>, AppError> {
    let applications: Vec<MyApplication> = sqlx::query_as(
        r#"
        SELECT ja.*, j.title AS job_title, j.company, j.location, j.salary,
               j.image_url AS company_logo
        FROM job_applications ja
        JOIN jobs j ON ja.job_id = j.id
        WHERE ja.user_id = $1
        ORDER BY ja.applied_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(applications))
}

/// DELETE /api/jobs/applications/:id
///
/// Withdraws the caller's own application while it is still pending.
pub async fn handle_cancel_application(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let cv_path: Option<String> = sqlx::query_scalar(
        r#"
        DELETE FROM job_applications
        WHERE id = $1 AND user_id = $2 AND status = 'pending'
        RETURNING cv_path
        "#,
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?;

    let cv_path = cv_path.ok_or_else(|| {
        AppError::Validation("Application not found or cannot be cancelled".to_string())
    })?;

    if let Err(e) = state.uploads.remove(&cv_path).await {
        warn!("Could not remove CV {cv_path} for cancelled application {id}: {e}");
    }
    info!("User {} cancelled application {id}", user.id);

    Ok(Json(MessageResponse {
        message: "Application cancelled successfully",
    }))
}

/// POST /api/jobs/:id/apply
///
/// Multipart form: `name`, `email` and a PDF under `cv`.
pub async fn handle_apply(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(job_id): AppPath<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    let mut form = read_form(multipart, "cv").await?;

    let (Some(name), Some(email), Some(cv)) = (form.text("name"), form.text("email"), form.file.take())
    else {
        return Err(AppError::Validation(
            "Name, email, and CV are required".to_string(),
        ));
    };
    if name.chars().count() > 100 {
        return Err(AppError::Validation(
            "\"name\" length must be less than or equal to 100 characters long".to_string(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(AppError::Validation(
            "\"email\" must be a valid email".to_string(),
        ));
    }
    if !UploadKind::Cv.accepts(&cv.content_type) {
        return Err(AppError::Validation(
            UploadKind::Cv.rejection_message().to_string(),
        ));
    }

    let job_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE id = $1 AND is_active = TRUE)")
            .bind(job_id)
            .fetch_one(&state.db)
            .await?;
    if !job_exists {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    let already_applied: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM job_applications WHERE job_id = $1 AND user_id = $2)",
    )
    .bind(job_id)
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;
    if already_applied {
        return Err(AppError::Conflict("Already applied".to_string()));
    }

    let cv_path = state.uploads.save(UploadKind::Cv, cv).await?;

    let inserted: Result<Uuid, AppError> = sqlx::query_scalar(
        r#"
        INSERT INTO job_applications (job_id, user_id, name, email, cv_path)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(job_id)
    .bind(user.id)
    .bind(&name)
    .bind(&email)
    .bind(&cv_path)
    .fetch_one(&state.db)
    .await
    .map_err(AppError::from);

    let application_id = match inserted {
        Ok(id) => id,
        Err(err) => {
            if let Err(e) = state.uploads.remove(&cv_path).await {
                warn!("Could not remove orphaned CV {cv_path}: {e}");
            }
            if err.is_unique_violation() {
                return Err(AppError::Conflict("Already applied".to_string()));
            }
            return Err(err);
        }
    };

    info!("User {} applied to job {job_id} (application {application_id})", user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            message: "Application submitted",
            application_id,
        }),
    ))
}
