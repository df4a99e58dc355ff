pub mod direct;
pub mod media;
pub mod transfer;
