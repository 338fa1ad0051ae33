//! ClipVault library management: profile listings, albums, sharing.
//!
//! Works against the same `MediaBackend` trait as the upload pipeline,
//! but returns `LibraryError` instead of `UploadError`.

pub mod error;
pub mod library;

pub use error::LibraryError;
pub use library::LibraryManager;
