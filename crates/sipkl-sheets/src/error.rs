use std::fmt;
use std::time::Duration;

/// Failures raised by the tabular store.
#[derive(Debug)]
pub enum StoreError {
    SheetNotFound(String),
    SheetExists(String),
    RowOutOfRange { sheet: String, row: usize },
    /// Writing the workbook file failed; the change was not applied.
    Persist(std::io::Error),
    /// The workbook file could not be decoded.
    Corrupt(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SheetNotFound(name) => write!(f, "Sheet '{}' not found", name),
            Self::SheetExists(name) => write!(f, "Sheet '{}' already exists", name),
            Self::RowOutOfRange { sheet, row } => {
                write!(f, "Row {} is out of range in sheet '{}'", row, sheet)
            }
            Self::Persist(e) => write!(f, "Failed to persist workbook: {}", e),
            Self::Corrupt(e) => write!(f, "Workbook file is corrupt: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Persist(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Corrupt(e)
    }
}

#[derive(Debug)]
pub enum LockError {
    Timeout(Duration),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(waited) => write!(
                f,
                "Server is busy, could not acquire the write lock within {} ms. Please try again.",
                waited.as_millis()
            ),
        }
    }
}

impl std::error::Error for LockError {}
