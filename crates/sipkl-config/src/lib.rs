//! # SIPKL Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`cors`]: Browser origins allowed to call the RPC endpoint
//! - [`lock`]: Wait limits for the workbook write lock
//! - [`server`]: Bind address
//! - [`storage`]: Blob storage directory and public URL
//! - [`store`]: Workbook location
//!
//! # Example
//!
//! ```ignore
//! use sipkl_config::{LockConfig, StoreConfig};
//!
//! let store_config = StoreConfig::from_env();
//! let lock_config = LockConfig::from_env();
//! ```

pub mod cors;
pub mod lock;
pub mod server;
pub mod storage;
pub mod store;

pub use cors::CorsConfig;
pub use lock::LockConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;
pub use store::StoreConfig;
