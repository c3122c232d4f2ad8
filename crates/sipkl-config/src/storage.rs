use std::env;
use std::path::PathBuf;

/// Where uploaded photos and generated exports are written.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub base_dir: PathBuf,
    /// Public URL prefix the files are served under
    pub base_url: String,
    pub max_file_size: usize,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            base_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("storage/files")),
            base_url: env::var("STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/files".to_string()),
            max_file_size: env::var("STORAGE_MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5 * 1024 * 1024), // 5MB
        }
    }
}
