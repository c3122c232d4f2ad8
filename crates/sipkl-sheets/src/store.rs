use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;

use crate::cell::CellValue;
use crate::error::StoreError;
use crate::workbook::Workbook;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type SharedStore = Arc<dyn TabularStore>;

/// Minimal tabular interface the services are written against.
///
/// Every read returns a fresh snapshot of the whole sheet; nothing is cached
/// between calls.
pub trait TabularStore: Send + Sync {
    fn sheet_names(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>>;

    fn has_sheet<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, StoreError>>;

    fn create_sheet<'a>(
        &'a self,
        name: &'a str,
        header: Vec<String>,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// All data rows with their stored values.
    fn get_rows<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Vec<CellValue>>, StoreError>>;

    /// All data rows rendered as the grid shows them.
    fn get_display_rows<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Vec<String>>, StoreError>>;

    fn write_cell<'a>(
        &'a self,
        name: &'a str,
        row: usize,
        col: usize,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Append a row and return its data-row index.
    fn append_row<'a>(
        &'a self,
        name: &'a str,
        values: Vec<String>,
    ) -> BoxFuture<'a, Result<usize, StoreError>>;

    fn delete_row<'a>(&'a self, name: &'a str, row: usize)
    -> BoxFuture<'a, Result<(), StoreError>>;
}

/// [`Workbook`] behind an async lock, optionally mirrored to a JSON file.
///
/// With a file, the file is the source of truth: every read and every
/// mutation starts by loading it, so a second process writing the same file
/// (the admin CLI next to the server) is never overwritten with a stale copy.
/// A mutation is applied to the freshly loaded workbook and written back
/// under the write guard; a failed write leaves the file unchanged.
pub struct WorkbookStore {
    workbook: RwLock<Workbook>,
    path: Option<PathBuf>,
}

impl WorkbookStore {
    pub fn in_memory() -> Self {
        Self::with_workbook(Workbook::new())
    }

    pub fn with_workbook(workbook: Workbook) -> Self {
        Self {
            workbook: RwLock::new(workbook),
            path: None,
        }
    }

    /// Load the workbook at `path`, starting empty if the file is absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let workbook = load(&path).await?;
        if workbook.sheet_names().is_empty() {
            tracing::info!(path = %path.display(), "Workbook file empty or absent, starting empty");
        }

        Ok(Self {
            workbook: RwLock::new(workbook),
            path: Some(path),
        })
    }

    pub async fn snapshot(&self) -> Result<Workbook, StoreError> {
        self.read(|wb| Ok(wb.clone())).await
    }

    async fn read<T>(&self, f: impl FnOnce(&Workbook) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let guard = self.workbook.read().await;

        let Some(path) = &self.path else {
            return f(&guard);
        };

        let current = load(path).await?;
        f(&current)
    }

    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Workbook) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.workbook.write().await;

        let Some(path) = &self.path else {
            return f(&mut guard);
        };

        let mut next = load(path).await?;
        let out = f(&mut next)?;
        persist(path, &next).await?;
        *guard = next;
        Ok(out)
    }
}

async fn load(path: &Path) -> Result<Workbook, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Workbook::new()),
        Err(e) => Err(e.into()),
    }
}

async fn persist(path: &Path, workbook: &Workbook) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let bytes = serde_json::to_vec_pretty(workbook)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

impl TabularStore for WorkbookStore {
    fn sheet_names(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        Box::pin(async move { self.read(|wb| Ok(wb.sheet_names())).await })
    }

    fn has_sheet<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, StoreError>> {
        Box::pin(async move { self.read(|wb| Ok(wb.has_sheet(name))).await })
    }

    fn create_sheet<'a>(
        &'a self,
        name: &'a str,
        header: Vec<String>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move { self.mutate(|wb| wb.create_sheet(name, header)).await })
    }

    fn get_rows<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Vec<CellValue>>, StoreError>> {
        Box::pin(async move { self.read(|wb| Ok(wb.sheet(name)?.rows.clone())).await })
    }

    fn get_display_rows<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Vec<String>>, StoreError>> {
        Box::pin(async move {
            self.read(|wb| {
                Ok(wb
                    .sheet(name)?
                    .rows
                    .iter()
                    .map(|row| row.iter().map(CellValue::display).collect())
                    .collect())
            })
            .await
        })
    }

    fn write_cell<'a>(
        &'a self,
        name: &'a str,
        row: usize,
        col: usize,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move { self.mutate(|wb| wb.write_cell(name, row, col, value)).await })
    }

    fn append_row<'a>(
        &'a self,
        name: &'a str,
        values: Vec<String>,
    ) -> BoxFuture<'a, Result<usize, StoreError>> {
        Box::pin(async move { self.mutate(|wb| wb.append_row(name, &values)).await })
    }

    fn delete_row<'a>(
        &'a self,
        name: &'a str,
        row: usize,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move { self.mutate(|wb| wb.delete_row(name, row)).await })
    }
}
