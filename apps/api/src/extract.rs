//! Request extractors whose rejections render through `AppError`, so malformed
//! paths, queries and bodies get the same JSON error envelope as handler errors.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::AppError;

/// `Path` with an `AppError` rejection. A segment that fails to parse (e.g. a
/// non-UUID id) cannot name an existing row and is reported as 404.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// `Query` with an `AppError` rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `Json` request body with an `AppError` rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
