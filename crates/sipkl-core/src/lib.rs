//! # SIPKL Core
//!
//! Core types, errors, and utilities for the SIPKL service.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`file_storage`]: Blob storage for photos and exports
//! - [`password`]: Password digests and session tokens
//! - [`serde`]: Lenient string-or-number deserializers for form fields
//! - [`text`]: Name/address normalization applied on write
//!
//! # Example
//!
//! ```ignore
//! use sipkl_core::errors::AppError;
//! use sipkl_core::password::{hash_password, generate_token};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student not found"));
//! let hash = hash_password("secret");
//! let token = generate_token();
//! ```

pub mod errors;
pub mod file_storage;
pub mod password;
pub mod serde;
pub mod text;

pub use errors::AppError;
pub use file_storage::{FileStorage, LocalFileStorage, StorageError};
pub use password::{generate_token, hash_password, verify_password};
