//! Kinora DB Library
//!
//! Metadata Store: the media catalog behind the [`MediaStore`] trait, with the
//! PostgreSQL implementation used in production.

pub mod db;

pub use db::{MediaStore, PgMediaStore};
#[cfg(feature = "memory")]
pub use db::InMemoryMediaStore;
