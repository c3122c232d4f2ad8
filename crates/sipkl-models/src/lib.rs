//! # SIPKL Models
//!
//! Domain records, their row codecs, and the request/response DTOs of the
//! SIPKL API.
//!
//! # Modules
//!
//! - [`schema`]: Sheet names, column positions, and identifier conventions
//! - [`accounts`]: Login accounts and the validated session summary
//! - [`students`]: Student profiles and their views
//! - [`requests`]: Action payloads with validation rules
//! - [`dashboard`]: Dashboard and statistics responses
//!
//! # Example
//!
//! ```ignore
//! use sipkl_models::accounts::{Account, Role};
//! use sipkl_models::schema::ACCOUNTS_SHEET;
//!
//! let rows = store.get_rows(ACCOUNTS_SHEET).await?;
//! let admins = rows
//!     .iter()
//!     .map(|row| Account::from_row(row))
//!     .filter(|a| a.role == Role::Admin);
//! ```

pub mod accounts;
pub mod dashboard;
pub mod requests;
pub mod schema;
pub mod students;

pub use accounts::{Account, AccountSummary, Department, Role};
pub use dashboard::{DashboardData, DashboardUser, StatsResponse};
pub use requests::{
    ChangePasswordRequest, CredentialsUpdate, DepartmentQuery, DetailForm, IdentifierRequest,
    LoginRequest, PhotoUpload, ProfileForm, RegisterRequest, TransferRequest,
};
pub use schema::{ACCOUNTS_SHEET, SCHEMA_VERSION, normalize_identifier};
pub use students::{DetailView, ProfileView, StudentListItem, StudentProfile};
