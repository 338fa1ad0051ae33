//! Chunked transfer primitives for ClipVault uploads.
//!
//! A blob is split into fixed-size, 1-based chunks. Partitioning is a pure
//! function of the blob length and the process-wide [`ChunkSize`], so the
//! chunk count announced at record creation always matches the chunks
//! actually written.

mod blob;
mod chunked;
mod encode;
mod progress;
mod types;

pub use blob::MediaBlob;
pub use chunked::{ChunkPlan, chunk_count, chunk_range};
pub use encode::encode_chunk;
pub use progress::{ChunkProgress, ProgressSnapshot};
pub use types::{ChunkDescriptor, ChunkSize};

/// Default chunk size: 500 KiB.
///
/// Stays well under the backend's per-message ingress limit once the
/// payload is expanded to its numeric JSON encoding.
pub const DEFAULT_CHUNK_SIZE: u64 = 500 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid chunk size: {0} (must be positive)")]
    InvalidChunkSize(u64),

    #[error("chunk index {index} out of range (1..={count})")]
    ChunkOutOfRange { index: u32, count: u32 },

    #[error("blob of {blob_len} bytes needs more than {max} chunks", max = u32::MAX)]
    TooManyChunks { blob_len: u64 },
}
