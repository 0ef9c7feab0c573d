use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::errors::AppError;
use crate::uploads::IncomingFile;

/// Text fields plus at most one file taken from a multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<IncomingFile>,
}

impl UploadForm {
    /// Trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Drains the multipart stream. Only `file_field` is read as a file; parts with
/// a filename under any other name are skipped.
pub async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            if !data.is_empty() {
                form.file = Some(IncomingFile {
                    original_name,
                    content_type,
                    data,
                });
            }
        } else if field.file_name().is_none() {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file is too large".to_string())
    } else {
        AppError::Validation(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::DefaultBodyLimit;
    use axum::http::{header, Request};
    use axum::routing::post;
    use axum::{Json, Router};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "jobboard-boundary";

    async fn echo_form(multipart: Multipart) -> Result<Json<Value>, AppError> {
        let form = read_form(multipart, "cv").await?;
        Ok(Json(json!({
            "name": form.text("name"),
            "email": form.text("email"),
            "fieldNames": form.fields.keys().cloned().collect::<Vec<_>>(),
            "file": form.file.map(|f| json!({
                "name": f.original_name,
                "type": f.content_type,
                "size": f.data.len(),
            })),
        })))
    }

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file_part(name: &str, filename: &str, content_type: &str, data: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n{data}\r\n"
        )
    }

    async fn submit(parts: &[String], limit: usize) -> (StatusCode, Value) {
        let app = Router::new()
            .route("/", post(echo_form))
            .layer(DefaultBodyLimit::max(limit));
        let body = format!("{}--{BOUNDARY}--\r\n", parts.concat());
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_reads_text_fields_and_file() {
        let (status, body) = submit(
            &[
                text_part("name", "  Ada Lovelace  "),
                text_part("email", "ada@example.com"),
                file_part("cv", "resume.pdf", "application/pdf", "%PDF-1.4"),
            ],
            64 * 1024,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada Lovelace");
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["file"]["name"], "resume.pdf");
        assert_eq!(body["file"]["type"], "application/pdf");
        assert_eq!(body["file"]["size"], 8);
    }

    #[tokio::test]
    async fn test_blank_text_field_is_absent() {
        let (_, body) = submit(&[text_part("name", "   ")], 64 * 1024).await;
        assert_eq!(body["name"], Value::Null);
    }

    #[tokio::test]
    async fn test_empty_file_part_is_skipped() {
        let (status, body) = submit(
            &[
                text_part("name", "Ada"),
                file_part("cv", "resume.pdf", "application/pdf", ""),
            ],
            64 * 1024,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["file"], Value::Null);
    }

    #[tokio::test]
    async fn test_files_under_other_names_are_ignored() {
        let (status, body) = submit(
            &[
                text_part("name", "Ada"),
                file_part("photo", "me.png", "image/png", "not-really-a-png"),
            ],
            64 * 1024,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["file"], Value::Null);
        assert_eq!(body["fieldNames"], json!(["name"]));
    }

    #[tokio::test]
    async fn test_oversized_body_is_payload_too_large() {
        let big = "x".repeat(4096);
        let (status, body) = submit(
            &[file_part("cv", "resume.pdf", "application/pdf", &big)],
            256,
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let app = Router::new().route("/", post(echo_form));
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(format!("--{BOUNDARY}\r\nContent-Disposition: form-data")))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
