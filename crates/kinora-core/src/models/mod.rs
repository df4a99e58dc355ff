//! Data models for the application
//!
//! `media` holds the catalog record and its request/response DTOs; `transfer` holds the
//! streaming upload and download messages.

mod media;
mod transfer;

pub use media::*;
pub use transfer::*;
