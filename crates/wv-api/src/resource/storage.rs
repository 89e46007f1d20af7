//! Disk storage for uploaded study material.
//!
//! Files land in `<root>/<category>/<millis>_<random>_<name>`. The record store only
//! keeps the resulting path, size and MIME type.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::Utc;
use regex::Regex;
use tokio::fs;
use uuid::Uuid;

use crate::error::ApiError;

/// Category used when the upload form does not name one
pub const DEFAULT_CATEGORY: &str = "document";

/// Extension allow-list per upload category
const ALLOWED_FILE_TYPES: &[(&str, &[&str])] = &[
    ("pdf", &[".pdf"]),
    ("image", &[".jpg", ".jpeg", ".png", ".gif", ".webp"]),
    ("video", &[".mp4", ".avi", ".mkv", ".mov"]),
    ("document", &[".doc", ".docx", ".txt", ".rtf"]),
];

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// A file written by [`UploadStorage::store`]
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Generated unique name
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
    max_file_size: usize,
}

impl UploadStorage {
    pub const fn new(root: PathBuf, max_file_size: usize) -> Self {
        Self {
            root,
            max_file_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Reject uploads over the configured limit
    pub fn check_size(&self, size: usize) -> Result<(), ApiError> {
        if size > self.max_file_size {
            return Err(ApiError::Upload(format!(
                "File too large. Maximum size is {}MB.",
                self.max_file_size / (1024 * 1024)
            )));
        }
        Ok(())
    }

    /// Validate and write an uploaded file
    pub async fn store(
        &self,
        category: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, ApiError> {
        validate_category(category)?;
        self.check_size(bytes.len())?;

        let original_name = base_name(original_name)?;
        check_extension(category, original_name)?;

        let dir = self.root.join(category);
        fs::create_dir_all(&dir).await?;

        let filename = unique_filename(original_name);
        let path = dir.join(&filename);
        fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored upload");

        Ok(StoredFile {
            filename,
            path,
            size: bytes.len() as u64,
        })
    }
}

/// Allowed extensions for a category; unknown categories accept every listed type
pub fn allowed_extensions(category: &str) -> Vec<&'static str> {
    ALLOWED_FILE_TYPES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, exts)| exts.to_vec())
        .unwrap_or_else(|| {
            ALLOWED_FILE_TYPES
                .iter()
                .flat_map(|(_, exts)| exts.iter().copied())
                .collect()
        })
}

fn validate_category(category: &str) -> Result<(), ApiError> {
    let valid = !category.is_empty()
        && category.len() <= 32
        && category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if !valid {
        return Err(ApiError::Upload(format!("Invalid category: {category}")));
    }
    Ok(())
}

/// Strip any directory components a client may have sent
fn base_name(original_name: &str) -> Result<&str, ApiError> {
    Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::Upload("Invalid file name".to_string()))
}

fn check_extension(category: &str, name: &str) -> Result<(), ApiError> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    if !allowed_extensions(category).contains(&ext.as_str()) {
        return Err(ApiError::Upload(format!(
            "File type {ext} not allowed for category {category}"
        )));
    }
    Ok(())
}

/// `<millis>_<random>_<name>`; the random part keeps same-millisecond uploads apart
fn unique_filename(original_name: &str) -> String {
    let id = Uuid::now_v7().simple().to_string();

    format!(
        "{}_{}_{}",
        Utc::now().timestamp_millis(),
        &id[24..],
        WHITESPACE_RE.replace_all(original_name, "_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_allowed_extensions() {
        assert_eq!(allowed_extensions("pdf"), vec![".pdf"]);
        let any = allowed_extensions("general");
        assert!(any.contains(&".pdf"));
        assert!(any.contains(&".mp4"));
        assert!(any.contains(&".docx"));
    }

    #[test]
    fn test_unique_filename_replaces_whitespace() {
        let name = unique_filename("my  study\tnotes.pdf");
        assert!(name.ends_with("_my_study_notes.pdf"), "got {name}");
    }

    #[test]
    fn test_unique_filename_differs_within_one_millisecond() {
        let names: Vec<String> = (0..50).map(|_| unique_filename("notes.pdf")).collect();

        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }

    #[test]
    fn test_base_name_strips_directories() {
        assert_eq!(base_name("../../etc/notes.pdf").unwrap(), "notes.pdf");
        assert!(base_name("").is_err());
    }

    #[tokio::test]
    async fn test_store_writes_file() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path().to_path_buf(), 1024);

        let stored = storage
            .store("pdf", "Chapter 1.PDF", b"%PDF-1.4")
            .await
            .expect("Upload should succeed");

        assert_eq!(stored.size, 8);
        assert!(stored.path.starts_with(dir.path().join("pdf")));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_same_name_uploads_do_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path().to_path_buf(), 1024);

        let first = storage.store("pdf", "notes.pdf", b"%PDF-1").await.unwrap();
        let second = storage.store("pdf", "notes.pdf", b"%PDF-2").await.unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(std::fs::read(&first.path).unwrap(), b"%PDF-1");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"%PDF-2");
    }

    #[tokio::test]
    async fn test_store_rejects_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path().to_path_buf(), 1024);

        let result = storage.store("pdf", "virus.exe", b"MZ").await;
        assert!(matches!(result, Err(ApiError::Upload(msg)) if msg.contains(".exe")));
    }

    #[tokio::test]
    async fn test_store_rejects_large_file() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path().to_path_buf(), 4);

        let result = storage.store("pdf", "big.pdf", b"%PDF-1.4").await;
        assert!(matches!(result, Err(ApiError::Upload(msg)) if msg.contains("too large")));
    }

    #[tokio::test]
    async fn test_store_rejects_path_in_category() {
        let dir = TempDir::new().unwrap();
        let storage = UploadStorage::new(dir.path().to_path_buf(), 1024);

        let result = storage.store("../pdf", "notes.pdf", b"%PDF").await;
        assert!(result.is_err());
    }
}
