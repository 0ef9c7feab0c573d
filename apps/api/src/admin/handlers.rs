//! Axum route handlers for the admin management surface.
//! Every handler takes `AdminUser`, so non-admins never reach the SQL below.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::admin::validation::{JobInput, JobPayload, RoleRequest, StatusRequest};
use crate::auth::extractor::AdminUser;
use crate::errors::AppError;
use crate::extract::{AppPath, AppJson};
use crate::jobs::handlers::MessageResponse;
use crate::models::application::{ApplicationDetail, ApplicationStatus, StatusCount};
use crate::models::job::{Job, JobWithCreator};
use crate::models::user::{Role, UserSummary};
use crate::state::AppState;
use crate::uploads::form::read_form;
use crate::uploads::{public_url, replaced_upload, UploadKind};

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_jobs: i64,
    pub total_users: i64,
    pub total_applications: i64,
    pub recent_jobs: i64,
    pub applications_by_status: Vec<StatusCount>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub message: &'static str,
    pub job: Job,
}

// ────────────────────────────────────────────────────────────────────────────
// Dashboard
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/admin/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<StatsResponse>, AppError> {
    let (total_jobs, total_users, total_applications, recent_jobs): (i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM jobs),
                (SELECT COUNT(*) FROM users WHERE role = 'user'),
                (SELECT COUNT(*) FROM job_applications),
                (SELECT COUNT(*) FROM jobs WHERE posted_at >= NOW() - INTERVAL '30 days')
            "#,
        )
        .fetch_one(&state.db)
        .await?;

    let applications_by_status: Vec<StatusCount> = sqlx::query_as(
        "SELECT status, COUNT(*) AS count FROM job_applications GROUP BY status ORDER BY status",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(StatsResponse {
        total_jobs,
        total_users,
        total_applications,
        recent_jobs,
        applications_by_status,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/admin/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<JobWithCreator>>, AppError> {
    let jobs: Vec<JobWithCreator> = sqlx::query_as(
        r#"
        SELECT j.*, u.first_name, u.last_name
        FROM jobs j
        LEFT JOIN users u ON j.created_by = u.id
        ORDER BY j.posted_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(jobs))
}

/// POST /api/admin/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(payload): AppJson<JobPayload>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    let input = payload.validate()?;

    let job: Job = sqlx::query_as(
        r#"
        INSERT INTO jobs (
            title, company, job_type, employment_type, seniority_level,
            location, is_remote, salary, description, image_url, created_by
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(&input.title)
    .bind(&input.company)
    .bind(&input.job_type)
    .bind(&input.employment_type)
    .bind(&input.seniority_level)
    .bind(&input.location)
    .bind(input.is_remote)
    .bind(input.salary)
    .bind(&input.description)
    .bind(&input.image_url)
    .bind(admin.id)
    .fetch_one(&state.db)
    .await?;

    info!("Admin {} created job {} ({})", admin.id, job.id, job.title);

    Ok((
        StatusCode::CREATED,
        Json(JobResponse {
            message: "Job created successfully",
            job,
        }),
    ))
}

/// PUT /api/admin/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<JobPayload>,
) -> Result<Json<JobResponse>, AppError> {
    let input = payload.validate()?;
    let previous = current_image_url(&state.db, id).await?;
    let job = update_job(&state.db, id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    remove_replaced_logo(&state, previous.as_deref(), job.image_url.as_deref()).await;
    info!("Admin {} updated job {id}", admin.id);

    Ok(Json(JobResponse {
        message: "Job updated successfully",
        job,
    }))
}

async fn update_job(pool: &PgPool, id: Uuid, input: &JobInput) -> Result<Option<Job>, AppError> {
    Ok(sqlx::query_as(
        r#"
        UPDATE jobs SET
            title = $1, company = $2, job_type = $3, employment_type = $4,
            seniority_level = $5, location = $6, is_remote = $7, salary = $8,
            description = $9, image_url = $10, updated_at = NOW()
        WHERE id = $11
        RETURNING *
        "#,
    )
    .bind(&input.title)
    .bind(&input.company)
    .bind(&input.job_type)
    .bind(&input.employment_type)
    .bind(&input.seniority_level)
    .bind(&input.location)
    .bind(input.is_remote)
    .bind(input.salary)
    .bind(&input.description)
    .bind(&input.image_url)
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

/// The job's `image_url`, or 404 when the job does not exist.
async fn current_image_url(pool: &PgPool, id: Uuid) -> Result<Option<String>, AppError> {
    let row: Option<Option<String>> = sqlx::query_scalar("SELECT image_url FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

// Only files we stored ourselves are cleaned up; external URLs are left alone.
async fn remove_replaced_logo(state: &AppState, previous: Option<&str>, current: Option<&str>) {
    if let Some(old_name) = replaced_upload(previous, current) {
        if let Err(e) = state.uploads.remove(old_name).await {
            warn!("Could not remove replaced logo {old_name}: {e}");
        }
    }
}

/// DELETE /api/admin/jobs/:id
///
/// Soft delete: the job disappears from public listings but its applications stay.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = sqlx::query("UPDATE jobs SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Job not found".to_string()));
    }
    info!("Admin {} deactivated job {id}", admin.id);

    Ok(Json(MessageResponse {
        message: "Job deleted successfully",
    }))
}

/// POST /api/admin/jobs/:id/logo
///
/// Multipart form with an image under `logo`.
pub async fn handle_upload_logo(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<JobResponse>, AppError> {
    let form = read_form(multipart, "logo").await?;
    let logo = form
        .file
        .ok_or_else(|| AppError::Validation("Logo image is required".to_string()))?;

    let previous = current_image_url(&state.db, id).await?;

    let stored = state.uploads.save(UploadKind::Logo, logo).await?;

    let job: Option<Job> = sqlx::query_as(
        "UPDATE jobs SET image_url = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(public_url(&stored))
    .bind(id)
    .fetch_optional(&state.db)
    .await?;
    let Some(job) = job else {
        if let Err(e) = state.uploads.remove(&stored).await {
            warn!("Could not remove orphaned logo {stored}: {e}");
        }
        return Err(AppError::NotFound("Job not found".to_string()));
    };

    remove_replaced_logo(&state, previous.as_deref(), job.image_url.as_deref()).await;

    info!("Admin {} set logo for job {id}", admin.id);

    Ok(Json(JobResponse {
        message: "Logo uploaded successfully",
        job,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Users
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/admin/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users: Vec<UserSummary> = sqlx::query_as(
        r#"
        SELECT u.id, u.first_name, u.last_name, u.email, u.role, u.created_at,
               (SELECT COUNT(*) FROM job_applications ja WHERE ja.user_id = u.id) AS application_count
        FROM users u
        ORDER BY u.created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(users))
}

/// PUT /api/admin/users/:id/role
pub async fn handle_update_user_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<RoleRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let role = req
        .role
        .as_deref()
        .and_then(Role::parse)
        .ok_or_else(|| AppError::Validation("Invalid role".to_string()))?;

    let result = sqlx::query("UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2")
        .bind(role)
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    info!("Admin {} set role of user {id} to {role:?}", admin.id);

    Ok(Json(MessageResponse {
        message: "User role updated successfully",
    }))
}

/// DELETE /api/admin/users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if id == admin.id {
        return Err(AppError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }

    let cv_paths: Vec<String> =
        sqlx::query_scalar("SELECT cv_path FROM job_applications WHERE user_id = $1")
            .bind(id)
            .fetch_all(&state.db)
            .await?;

    // Applications go with the user via ON DELETE CASCADE.
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    for cv_path in &cv_paths {
        if let Err(e) = state.uploads.remove(cv_path).await {
            warn!("Could not remove CV {cv_path} of deleted user {id}: {e}");
        }
    }
    info!("Admin {} deleted user {id}", admin.id);

    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Applications
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/admin/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ApplicationDetail>>, AppError> {
    let applications: Vec<ApplicationDetail> = sqlx::query_as(
        r#"
        SELECT ja.*,
               u.first_name, u.last_name, u.email AS user_email,
               j.title AS job_title, j.company
        FROM job_applications ja
        JOIN users u ON ja.user_id = u.id
        JOIN jobs j ON ja.job_id = j.id
        ORDER BY ja.applied_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(applications))
}

/// PUT /api/admin/applications/:id/status
pub async fn handle_update_application_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<StatusRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let status = req
        .status
        .as_deref()
        .and_then(ApplicationStatus::parse)
        .ok_or_else(|| AppError::Validation("Invalid status".to_string()))?;

    let result = sqlx::query("UPDATE job_applications SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Application not found".to_string()));
    }
    info!("Admin {} set application {id} to {status:?}", admin.id);

    Ok(Json(MessageResponse {
        message: "Application status updated successfully",
    }))
}
