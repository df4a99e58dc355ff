//! Transfer orchestration over the catalog and the object store.

mod catalog;
mod download;
mod service;
mod upload;

pub use catalog::CachedCatalog;
pub use download::{Download, DownloadStreamer};
pub use service::{MediaService, PresignedUrl};
pub use upload::UploadAssembler;
