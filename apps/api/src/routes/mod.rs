pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::admin::handlers as admin;
use crate::auth::handlers as auth;
use crate::errors::AppError;
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::uploads::PUBLIC_PREFIX;

async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let upload_dir = state.config.upload_dir.clone();

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/me", get(auth::handle_me))
        .route("/api/auth/profile", put(auth::handle_update_profile))
        // Jobs
        .route("/api/jobs", get(jobs::handle_list_jobs))
        .route("/api/jobs/applications/my", get(jobs::handle_my_applications))
        .route(
            "/api/jobs/applications/:id",
            delete(jobs::handle_cancel_application),
        )
        .route("/api/jobs/:id", get(jobs::handle_get_job))
        .route("/api/jobs/:id/apply", post(jobs::handle_apply))
        // Admin
        .route("/api/admin/stats", get(admin::handle_stats))
        .route(
            "/api/admin/jobs",
            get(admin::handle_list_jobs).post(admin::handle_create_job),
        )
        .route(
            "/api/admin/jobs/:id",
            put(admin::handle_update_job).delete(admin::handle_delete_job),
        )
        .route("/api/admin/jobs/:id/logo", post(admin::handle_upload_logo))
        .route("/api/admin/users", get(admin::handle_list_users))
        .route(
            "/api/admin/users/:id",
            delete(admin::handle_delete_user),
        )
        .route(
            "/api/admin/users/:id/role",
            put(admin::handle_update_user_role),
        )
        .route(
            "/api/admin/applications",
            get(admin::handle_list_applications),
        )
        .route(
            "/api/admin/applications/:id/status",
            put(admin::handle_update_application_status),
        )
        // Stored CVs and logos
        .nest_service(PUBLIC_PREFIX, ServeDir::new(upload_dir))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
