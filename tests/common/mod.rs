#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sipkl::cli::{create_department, setup_accounts};
use sipkl::router::init_router;
use sipkl::state::AppState;
use sipkl_config::{CorsConfig, LockConfig, StorageConfig};
use sipkl_core::password::DEFAULT_PASSWORD;
use sipkl_models::accounts::{AccountSummary, Department, Role};
use sipkl_sheets::store::BoxFuture;
use sipkl_sheets::{CellValue, ScriptLock, SharedStore, StoreError, TabularStore, WorkbookStore};
use tempfile::TempDir;
use tower::ServiceExt;

pub const DEPARTMENTS: [&str; 2] = ["tjkt", "tata_boga"];

/// App state over an in-memory workbook. Keep the `TempDir` alive for as
/// long as the state is used; uploaded files live in it.
pub struct TestApp {
    pub state: AppState,
    pub files: TempDir,
}

impl TestApp {
    pub fn store(&self) -> &dyn sipkl_sheets::TabularStore {
        &*self.state.store
    }

    pub fn storage(&self) -> &dyn sipkl_core::file_storage::FileStorage {
        &*self.state.storage
    }

    pub fn lock(&self) -> &ScriptLock {
        &self.state.lock
    }

    pub fn wait(&self) -> Duration {
        self.state.lock_config.write_timeout
    }
}

pub fn empty_app() -> TestApp {
    app_with_store(Arc::new(WorkbookStore::in_memory()))
}

/// Like [`seeded_app`], with writers giving up on the lock after `wait`.
pub async fn seeded_app_with_wait(wait: Duration) -> TestApp {
    let mut app = seeded_app().await;
    app.state.lock_config = LockConfig {
        write_timeout: wait,
        credential_timeout: wait,
    };
    app
}

pub fn app_with_store(store: SharedStore) -> TestApp {
    let files = TempDir::new().unwrap();
    let storage_config = StorageConfig {
        base_dir: files.path().to_path_buf(),
        base_url: "http://localhost:3000/files".to_string(),
        max_file_size: 1024 * 1024,
    };
    let state = AppState::new(
        store,
        storage_config,
        LockConfig::default(),
        CorsConfig::from_origins("http://localhost:5173"),
    );
    TestApp { state, files }
}

/// Default admins plus the `tjkt` and `tata_boga` department sheets.
pub async fn seeded_app() -> TestApp {
    let app = empty_app();
    setup_accounts(app.store()).await.unwrap();
    for department in DEPARTMENTS {
        create_department(app.store(), department).await.unwrap();
    }
    app
}

pub fn student(identifier: &str, department: &str) -> AccountSummary {
    AccountSummary {
        identifier: identifier.to_string(),
        role: Role::Student,
        department: Department::new(department),
        name: String::new(),
    }
}

/// POST one action through the full router and return the envelope.
pub async fn rpc(app: &TestApp, action: &str, payload: Value) -> Value {
    let router = init_router(app.state.clone());
    let request = Request::builder()
        .method("POST")
        .uri("/api/rpc")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({ "action": action, "payload": payload })).unwrap(),
        ))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub async fn login(app: &TestApp, identifier: &str, password: &str) -> String {
    let body = rpc(
        app,
        "login",
        json!({ "identifier": identifier, "password": password }),
    )
    .await;
    assert_eq!(body["success"], true, "login failed: {}", body);
    body["sessionToken"].as_str().unwrap().to_string()
}

pub async fn login_admin(app: &TestApp, identifier: &str) -> String {
    login(app, identifier, DEFAULT_PASSWORD).await
}

pub async fn register(app: &TestApp, identifier: &str, name: &str, department: &str) -> Value {
    rpc(
        app,
        "register",
        json!({
            "identifier": identifier,
            "password": "rahasia",
            "name": name,
            "department": department,
        }),
    )
    .await
}

/// Call an action with `token` merged into the payload.
pub async fn call(app: &TestApp, token: &str, action: &str, mut payload: Value) -> Value {
    payload["sessionToken"] = Value::String(token.to_string());
    rpc(app, action, payload).await
}

/// Store that passes everything through, except appends or deletes on one
/// sheet, which fail as if the disk were full.
pub struct FailingStore {
    inner: SharedStore,
    append_fails_on: Option<&'static str>,
    delete_fails_on: Option<&'static str>,
}

impl FailingStore {
    pub fn new(inner: SharedStore) -> Self {
        Self {
            inner,
            append_fails_on: None,
            delete_fails_on: None,
        }
    }

    pub fn failing_append(mut self, sheet: &'static str) -> Self {
        self.append_fails_on = Some(sheet);
        self
    }

    pub fn failing_delete(mut self, sheet: &'static str) -> Self {
        self.delete_fails_on = Some(sheet);
        self
    }

    fn disk_full() -> StoreError {
        StoreError::Persist(std::io::Error::other("disk full"))
    }
}

impl TabularStore for FailingStore {
    fn sheet_names(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        self.inner.sheet_names()
    }

    fn has_sheet<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, StoreError>> {
        self.inner.has_sheet(name)
    }

    fn create_sheet<'a>(
        &'a self,
        name: &'a str,
        header: Vec<String>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        self.inner.create_sheet(name, header)
    }

    fn get_rows<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Vec<CellValue>>, StoreError>> {
        self.inner.get_rows(name)
    }

    fn get_display_rows<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Vec<String>>, StoreError>> {
        self.inner.get_display_rows(name)
    }

    fn write_cell<'a>(
        &'a self,
        name: &'a str,
        row: usize,
        col: usize,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        self.inner.write_cell(name, row, col, value)
    }

    fn append_row<'a>(
        &'a self,
        name: &'a str,
        values: Vec<String>,
    ) -> BoxFuture<'a, Result<usize, StoreError>> {
        if self.append_fails_on == Some(name) {
            return Box::pin(async { Err(Self::disk_full()) });
        }
        self.inner.append_row(name, values)
    }

    fn delete_row<'a>(
        &'a self,
        name: &'a str,
        row: usize,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        if self.delete_fails_on == Some(name) {
            return Box::pin(async { Err(Self::disk_full()) });
        }
        self.inner.delete_row(name, row)
    }
}
