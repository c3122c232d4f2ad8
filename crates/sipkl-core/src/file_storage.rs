//! Blob storage for student photos and exported reports.
//!
//! Business code only sees the [`FileStorage`] trait: it hands over bytes and
//! gets back an opaque key, reads the bytes back by key, and can turn a key
//! into a public URL. The
//! shipped [`LocalFileStorage`] writes below a directory that the HTTP layer
//! serves under `/files`.
//!
//! # Example
//!
//! ```ignore
//! use sipkl_core::file_storage::{FileStorage, LocalFileStorage};
//! use std::path::PathBuf;
//!
//! let storage = LocalFileStorage::new(
//!     PathBuf::from("./storage/files"),
//!     "http://localhost:3000/files".to_string(),
//! );
//!
//! let key = storage.save("photos/00123_ab12.jpg", &bytes, "image/jpeg").await?;
//! let url = storage.get_url(&key)?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::fs;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Abstract trait for blob storage backends.
pub trait FileStorage: Send + Sync {
    /// Save content under `key` and return the storage key.
    ///
    /// `mime_type` is checked against the backend's allow list.
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
        mime_type: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>>;

    /// Bytes stored under `key`.
    fn read<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, StorageError>>;

    /// Delete a file by key. Missing files are not an error.
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Public URL for a stored key.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

/// Error type for file storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// File exceeds maximum allowed size.
    InvalidFileSize { max_bytes: usize },

    /// MIME type not allowed.
    InvalidMimeType {
        received: String,
        allowed: Vec<String>,
    },

    /// I/O error (file system or similar).
    IoError(std::io::Error),

    /// Invalid storage key format.
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received, allowed } => {
                write!(
                    f,
                    "MIME type '{}' not allowed. Allowed types: {}",
                    received,
                    allowed.join(", ")
                )
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Local filesystem-based storage.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
    allowed_mime_types: Vec<String>,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self::with_max_size(base_dir, base_url, 5 * 1024 * 1024)
    }

    pub fn with_max_size(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
            allowed_mime_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/webp".to_string(),
                XLSX_MIME.to_string(),
            ],
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Reject empty keys, traversal, absolute paths and odd characters.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_mime(&self, mime_type: &str) -> Result<(), StorageError> {
        if self.allowed_mime_types.iter().any(|m| m == mime_type) {
            return Ok(());
        }
        Err(StorageError::InvalidMimeType {
            received: mime_type.to_string(),
            allowed: self.allowed_mime_types.clone(),
        })
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
        mime_type: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            Self::validate_key(key)?;
            self.validate_mime(mime_type)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            tracing::debug!(key, bytes = content.len(), "Stored file");
            Ok(key.to_string())
        })
    }

    fn read<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, StorageError>> {
        Box::pin(async move {
            Self::validate_key(key)?;
            Ok(fs::read(self.base_dir.join(key)).await?)
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            Self::validate_key(key)?;

            let file_path = self.base_dir.join(key);
            match fs::remove_file(&file_path).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}
