//! Data types for the upload flow.

use clipvault_protocol::RecordId;

/// Progress event emitted while an upload runs.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// The backend created the record; chunk writes follow.
    RecordCreated {
        record_id: RecordId,
        chunk_count: u32,
    },
    /// The thumbnail was stored.
    ThumbnailStored { record_id: RecordId },
    /// The thumbnail store failed; the upload continues without it.
    ThumbnailSkipped { record_id: RecordId, error: String },
    /// One chunk write was acknowledged. Order across chunks is not guaranteed.
    ChunkAcknowledged {
        record_id: RecordId,
        index: u32,
        acknowledged: u32,
        total: u32,
        progress: f64,
        /// Average throughput since the first chunk write started.
        bytes_per_second: f64,
    },
    /// The record was read back after all chunks settled.
    Verified { record_id: RecordId },
    /// The upload aborted.
    Failed { error: String },
}

/// Lifecycle of an [`UploadSession`](crate::UploadSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No blob selected.
    #[default]
    Idle,
    /// A blob is selected; caption, metadata and id may still change.
    Armed,
    /// Ready was raised with a blob present; the upload is about to start.
    ///
    /// Transient: `trigger` moves on to `Uploading` before it first awaits,
    /// so watchers never observe this value.
    Triggered,
    /// The orchestrator is running. Intent fields are frozen.
    Uploading,
}
