use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::token::TokenService;
use crate::config::Config;
use crate::uploads::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub tokens: TokenService,
    /// CV and logo storage. Default: `LocalDiskStore` rooted at `UPLOAD_DIR`.
    pub uploads: Arc<dyn UploadStore>,
}
