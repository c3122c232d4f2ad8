//! # SIPKL Sheets
//!
//! The workbook is the service's only persistence: a set of sheets addressed
//! by name, each a header row followed by data rows of loosely typed cells.
//! Business code talks to it exclusively through [`TabularStore`], so the
//! backend can be replaced without touching the services.
//!
//! - [`cell`]: Cell values and the spreadsheet input rules
//! - [`workbook`]: In-memory sheet operations
//! - [`store`]: The async [`TabularStore`] trait and [`WorkbookStore`]
//! - [`lock`]: Time-boxed mutual exclusion for check-then-write sequences
//!
//! Row indices are 0-based and count data rows only; the header is never
//! returned or addressable. Column indices are 0-based as well.

pub mod cell;
pub mod error;
pub mod lock;
pub mod store;
pub mod workbook;

pub use cell::CellValue;
pub use error::{LockError, StoreError};
pub use lock::{LockGuard, ScriptLock};
pub use store::{SharedStore, TabularStore, WorkbookStore};
pub use workbook::{Sheet, Workbook};
