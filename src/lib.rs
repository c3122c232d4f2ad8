//! # SIPKL API
//!
//! Record keeping for vocational school internships (PKL). Students sign up
//! into a department, keep their contact details and photo current, and
//! department admins review, edit and export the records of their own
//! department. A super admin sees every department and can move students
//! between them.
//!
//! ## Storage
//!
//! Everything lives in one workbook (see `sipkl_sheets`): a `users` sheet of
//! login accounts and one profile sheet per department, named by the
//! department code. Departments are simply the sheets other than `users`.
//! Photos and exported reports are files behind `sipkl_core::file_storage`.
//!
//! ## Protocol
//!
//! The client speaks a single action-based endpoint:
//!
//! ```text
//! POST /api/rpc
//! { "action": "getAdminData", "payload": { "sessionToken": "...", "department": "tjkt" } }
//! ```
//!
//! The response is always HTTP 200 with `{ "success": bool, ... }`; see
//! [`dispatch`] for the action table and the session and scoping rules.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── dispatch/        # Action envelope, dispatcher, HTTP handler
//! ├── modules/         # Feature modules
//! │   ├── auth/       # Login, session tokens, self sign-up
//! │   ├── accounts/   # Account administration, transfers, credentials
//! │   ├── students/   # Profiles, photos, department listings
//! │   └── dashboard/  # Bootstrap data, statistics, xlsx export
//! ├── tables.rs        # Row lookups shared by the services
//! ├── cli/             # Workbook setup and maintenance (used by sipkl-cli)
//! └── bin/cli.rs       # The sipkl-cli binary
//! ```
//!
//! Each feature module has a `model.rs` (DTOs) and a `service.rs` (a unit
//! struct with one associated async fn per operation).
//!
//! ## Security Considerations
//!
//! - Passwords are stored as unsalted SHA-256 digests
//! - Session tokens never expire and there is no logout; a token stays valid
//!   until the account logs in again
//! - Department admins are confined to their own department by the
//!   dispatcher, independent of what the client sends

pub mod cli;
pub mod dispatch;
pub mod docs;
pub mod logging;
pub mod modules;
pub mod router;
pub mod state;
pub mod tables;
pub mod validator;

// Re-export workspace crates for convenience
pub use sipkl_config;
pub use sipkl_core;
pub use sipkl_models;
pub use sipkl_sheets;
