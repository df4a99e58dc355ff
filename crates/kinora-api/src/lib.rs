//! Kinora API Library
//!
//! HTTP transport for the media transfer service: handlers, error mapping, and
//! application setup.

mod api_doc;
pub mod error;
mod extract;
mod handlers;
pub mod setup;
pub mod state;
mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
