//! ClipVault upload pipeline: record creation, concurrent chunk writes,
//! verification.
//!
//! This crate holds the upload business logic with no transport of its own.
//! Callers provide a [`MediaBackend`] implementation that reaches the actual
//! store; [`MemoryBackend`] is an in-process one for tests and dry runs.
//!
//! # Pipeline
//!
//! 1. **Plan**: partition the blob into fixed-size chunks
//! 2. **Create**: write the record metadata, receive a record id
//! 3. **Thumbnail**: best-effort, failures are only logged
//! 4. **Chunks**: write every chunk concurrently
//! 5. **Verify**: read the record back as the owning user

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod metadata;
pub mod orchestrator;
pub mod record;
pub mod session;
pub mod thumbnail;
pub mod types;

pub use backend::{BackendFuture, MediaBackend};
pub use config::{UploaderConfig, config_path};
pub use error::{
    BackendError, ChunkFailure, ConfigError, RemoteWriteError, ThumbnailError, UploadError,
};
pub use memory::MemoryBackend;
pub use metadata::UploadMetadata;
pub use orchestrator::Uploader;
pub use record::{build_record_init, extract_tags, resolve_caption, strip_media_suffix};
pub use session::UploadSession;
pub use types::{SessionState, UploadEvent};
