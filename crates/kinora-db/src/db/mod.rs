//! Database repositories for data access layer
//!
//! A single table backs the catalog; see `migrations/` at the workspace root.

#[allow(clippy::module_inception)]
pub mod media;
#[cfg(feature = "memory")]
pub mod memory;

pub use media::{MediaStore, PgMediaStore};
#[cfg(feature = "memory")]
pub use memory::InMemoryMediaStore;
