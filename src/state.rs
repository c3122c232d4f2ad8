use std::sync::Arc;

use sipkl_config::{CorsConfig, LockConfig, StorageConfig, StoreConfig};
use sipkl_core::file_storage::{FileStorage, LocalFileStorage};
use sipkl_sheets::{ScriptLock, SharedStore, StoreError, WorkbookStore};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Serializes check-then-write sequences and row-addressed writes.
    pub lock: ScriptLock,
    pub lock_config: LockConfig,
    pub storage: Arc<dyn FileStorage>,
    pub storage_config: StorageConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        store: SharedStore,
        storage_config: StorageConfig,
        lock_config: LockConfig,
        cors_config: CorsConfig,
    ) -> Self {
        let storage = LocalFileStorage::with_max_size(
            storage_config.base_dir.clone(),
            storage_config.base_url.clone(),
            storage_config.max_file_size,
        );

        Self {
            store,
            lock: ScriptLock::new(),
            lock_config,
            storage: Arc::new(storage),
            storage_config,
            cors_config,
        }
    }
}

/// Open the workbook named by [`StoreConfig`], or an in-memory one.
pub async fn open_store(config: &StoreConfig) -> Result<SharedStore, StoreError> {
    let store = match &config.workbook_path {
        Some(path) => WorkbookStore::open(path).await?,
        None => WorkbookStore::in_memory(),
    };
    Ok(Arc::new(store))
}

pub async fn init_app_state() -> Result<AppState, StoreError> {
    let store = open_store(&StoreConfig::from_env()).await?;

    Ok(AppState::new(
        store,
        StorageConfig::from_env(),
        LockConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
