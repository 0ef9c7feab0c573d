mod admin;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod jobs;
mod models;
mod routes;
mod state;
mod uploads;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::token::TokenService;
use crate::config::Config;
use crate::db::{create_pool, run_migrations, seed_default_admin};
use crate::routes::build_router;
use crate::state::AppState;
use crate::uploads::LocalDiskStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobSeeker API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&db).await?;
    seed_default_admin(&db, &config).await?;

    // Initialize upload storage
    let uploads = LocalDiskStore::new(&config.upload_dir);
    uploads.ensure_root().await.with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;
    info!("Storing uploads in {}", uploads.root().display());

    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.jwt_ttl);
    info!("Session tokens expire after {}s", config.jwt_ttl.num_seconds());

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        tokens,
        uploads: Arc::new(uploads),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
