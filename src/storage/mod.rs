//! Upload storage for notes and syllabus files.
//!
//! Files live under `<root>/notes` and `<root>/syllabus`, named after the
//! sanitized client file name. A later upload with the same name replaces
//! the earlier file.

use std::path::{Path, PathBuf};

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::errors::AppError;

/// Folder an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Note,
    Syllabus,
}

impl UploadKind {
    fn dir_name(&self) -> &'static str {
        match self {
            UploadKind::Note => "notes",
            UploadKind::Syllabus => "syllabus",
        }
    }
}

/// A file written to disk.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub file_path: String,
}

/// Disk-backed upload storage.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under the folder of `kind`.
    pub async fn save(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, AppError> {
        let file_name = sanitize_filename(original_name);
        if file_name.is_empty() {
            return Err(AppError::Validation("No file selected".to_string()));
        }

        let dir = self.root.join(kind.dir_name());
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!("Stored upload {:?} ({} bytes)", path, bytes.len());

        Ok(StoredFile {
            file_name,
            file_path: path.to_string_lossy().into_owned(),
        })
    }

    /// Read a stored file back for download.
    pub async fn read(&self, file_path: &str) -> Result<Vec<u8>, AppError> {
        match tokio::fs::read(file_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found on server".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A stored file sent back as an attachment.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.file_name),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// Reduce a client-supplied file name to a safe, flat name.
///
/// Path separators become spaces, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped, and leading or trailing dots and
/// underscores are stripped.
pub fn sanitize_filename(name: &str) -> String {
    let flattened = name.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_plain_name() {
        assert_eq!(sanitize_filename("My Notes.pdf"), "My_Notes.pdf");
        assert_eq!(sanitize_filename("unit-1_v2.docx"), "unit-1_v2.docx");
    }

    #[test]
    fn test_sanitize_strips_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\x.txt"), "C_Users_me_x.txt");
    }

    #[test]
    fn test_sanitize_drops_unsafe_characters() {
        assert_eq!(sanitize_filename("résumé (final).pdf"), "rsum_final.pdf");
        assert_eq!(sanitize_filename("..."), "");
        assert_eq!(sanitize_filename(""), "");
    }

    #[tokio::test]
    async fn test_save_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path());

        let stored = store
            .save(UploadKind::Syllabus, "Maths Syllabus.pdf", b"units")
            .await
            .unwrap();
        assert_eq!(stored.file_name, "Maths_Syllabus.pdf");
        assert!(stored.file_path.contains("syllabus"));

        let bytes = store.read(&stored.file_path).await.unwrap();
        assert_eq!(bytes, b"units");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path());
        let missing = temp_dir.path().join("notes").join("gone.pdf");

        let err = store.read(&missing.to_string_lossy()).await.unwrap_err();
        assert_eq!(err.message(), "File not found on server");
    }
}
