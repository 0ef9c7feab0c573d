//! Upload storage: CVs and company logos persisted to disk and served under `/uploads`.
//!
//! `AppState` carries an `Arc<dyn UploadStore>` so handlers never touch the filesystem directly.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

pub mod form;

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

const IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/svg+xml",
    "image/webp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Cv,
    Logo,
}

impl UploadKind {
    pub fn accepts(self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match self {
            UploadKind::Cv => essence == "application/pdf",
            UploadKind::Logo => IMAGE_TYPES.contains(&essence.as_str()),
        }
    }

    pub fn rejection_message(self) -> &'static str {
        match self {
            UploadKind::Cv => "Only PDF files allowed",
            UploadKind::Logo => "Only PNG, JPEG, GIF, SVG or WebP images allowed",
        }
    }
}

/// A file received from a multipart form, not yet persisted.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persists the file and returns the stored file name.
    async fn save(&self, kind: UploadKind, file: IncomingFile) -> Result<String, AppError>;

    /// Deletes a previously stored file. Missing files are not an error.
    async fn remove(&self, stored_name: &str) -> Result<(), AppError>;
}

/// Stores uploads as flat files inside a single directory.
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the upload directory if it does not exist yet.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }
}

#[async_trait]
impl UploadStore for LocalDiskStore {
    async fn save(&self, kind: UploadKind, file: IncomingFile) -> Result<String, AppError> {
        if !kind.accepts(&file.content_type) {
            return Err(AppError::Validation(kind.rejection_message().to_string()));
        }
        if file.data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let nonce = Uuid::new_v4().simple().to_string();
        let stored_name = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            &nonce[..8],
            sanitize_filename(&file.original_name)
        );
        let path = self.root.join(&stored_name);

        tokio::fs::write(&path, &file.data)
            .await
            .map_err(|e| AppError::Storage(format!("writing {}: {e}", path.display())))?;

        info!("Stored {:?} upload {} ({} bytes)", kind, stored_name, file.data.len());
        Ok(stored_name)
    }

    async fn remove(&self, stored_name: &str) -> Result<(), AppError> {
        let safe = sanitize_filename(stored_name);
        if safe != stored_name {
            warn!("Refusing to remove suspicious upload name {stored_name:?}");
            return Ok(());
        }
        match tokio::fs::remove_file(self.root.join(&safe)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("removing {safe}: {e}"))),
        }
    }
}

/// Reduces a client-supplied name to a safe flat file name.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.chars().take(120).collect()
    }
}

/// Public URL for a stored file.
pub fn public_url(stored_name: &str) -> String {
    format!("{PUBLIC_PREFIX}/{stored_name}")
}

/// The stored file behind a `/uploads/<name>` URL. `None` for external URLs and
/// for names this store could never have written (`.`, `..`, nested paths).
pub fn stored_name(url: &str) -> Option<&str> {
    let name = url.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
    let plain = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    plain.then_some(name)
}

/// Stored file that `previous` pointed at and `current` no longer does.
pub fn replaced_upload<'a>(previous: Option<&'a str>, current: Option<&str>) -> Option<&'a str> {
    let old = stored_name(previous?)?;
    (current.and_then(stored_name) != Some(old)).then_some(old)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> IncomingFile {
        IncomingFile {
            original_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4 test"),
        }
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\cv.pdf"), "cv.pdf");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_chars() {
        assert_eq!(sanitize_filename("my cv (final).pdf"), "my_cv__final_.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn test_kind_accepts() {
        assert!(UploadKind::Cv.accepts("application/pdf"));
        assert!(UploadKind::Cv.accepts("Application/PDF; charset=binary"));
        assert!(!UploadKind::Cv.accepts("image/png"));
        assert!(UploadKind::Logo.accepts("image/svg+xml"));
        assert!(!UploadKind::Logo.accepts("application/pdf"));
    }

    #[tokio::test]
    async fn test_save_and_remove_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());

        let name = store.save(UploadKind::Cv, pdf("resume.pdf")).await.unwrap();
        assert!(name.ends_with("-resume.pdf"));
        let written = tokio::fs::read(dir.path().join(&name)).await.unwrap();
        assert_eq!(written, b"%PDF-1.4 test");

        store.remove(&name).await.unwrap();
        assert!(!dir.path().join(&name).exists());
        // Second removal is a no-op.
        store.remove(&name).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());
        let mut file = pdf("resume.docx");
        file.content_type =
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into();

        let err = store.save(UploadKind::Cv, file).await.unwrap_err();
        assert!(err.to_string().contains("Only PDF files allowed"));
    }

    #[tokio::test]
    async fn test_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());
        let mut file = pdf("empty.pdf");
        file.data = Bytes::new();
        assert!(store.save(UploadKind::Cv, file).await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_root_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path().join("nested/uploads"));
        store.ensure_root().await.unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_public_url() {
        assert_eq!(public_url("1-logo.png"), "/uploads/1-logo.png");
    }

    #[test]
    fn test_stored_name() {
        assert_eq!(stored_name("/uploads/1-ab12cd34-logo.png"), Some("1-ab12cd34-logo.png"));
        assert_eq!(stored_name("https://cdn.example.com/uploads/logo.png"), None);
        assert_eq!(stored_name("/uploads/"), None);
        assert_eq!(stored_name("/uploads/.."), None);
        assert_eq!(stored_name("/uploads/."), None);
        assert_eq!(stored_name("/uploads/a/b.png"), None);
        assert_eq!(stored_name("/uploadsx.png"), None);
    }

    #[test]
    fn test_replaced_upload() {
        let old = Some("/uploads/1-old.png");
        assert_eq!(replaced_upload(old, Some("/uploads/2-new.png")), Some("1-old.png"));
        assert_eq!(replaced_upload(old, None), Some("1-old.png"));
        assert_eq!(replaced_upload(old, Some("https://cdn.example.com/x.png")), Some("1-old.png"));
        assert_eq!(replaced_upload(old, old), None);
        assert_eq!(replaced_upload(Some("https://cdn.example.com/x.png"), None), None);
        assert_eq!(replaced_upload(None, Some("/uploads/2-new.png")), None);
    }
}
