//! Kinora Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! helpers shared by the storage, catalog, transfer, and API crates.

pub mod config;
pub mod constants;
pub mod content_type;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{CacheConfig, Config, DatabaseConfig, LogFormat, StorageConfig};
pub use content_type::content_type_for_file_name;
pub use error::{AppError, ErrorKind, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
