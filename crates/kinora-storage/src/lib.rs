//! Kinora Storage Library
//!
//! Object Store Adapter: the [`Storage`] trait plus S3 (object_store) and local
//! filesystem implementations.
//!
//! # Storage key format
//!
//! Every backend stores a record's content at `{owner_id}/{record_id}/{file_name}`.
//! Key generation lives in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::object_key;
pub use kinora_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Settings, S3Storage};
pub use traits::{ByteStream, ObjectReader, ObjectStat, Storage, StorageError, StorageResult};
