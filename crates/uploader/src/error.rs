//! Upload error types.

use clipvault_protocol::RecordId;
use clipvault_transfer::TransferError;

/// Failure reported by a [`MediaBackend`](crate::MediaBackend) call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend rejected request ({code}): {message}")]
    Rejected { code: i32, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    pub fn rejected(code: i32, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }
}

/// One chunk write the backend did not acknowledge.
#[derive(Debug, thiserror::Error)]
#[error("chunk {index}: {source}")]
pub struct ChunkFailure {
    pub index: u32,
    #[source]
    pub source: BackendError,
}

/// A write the backend rejected. Fatal to the upload; never retried.
#[derive(Debug, thiserror::Error)]
pub enum RemoteWriteError {
    #[error("record creation rejected: {0}")]
    CreateRecord(#[source] BackendError),

    /// Every chunk write was driven to completion; these are the ones that failed.
    #[error("{} of {total} chunk writes for {record_id} rejected", .failures.len())]
    Chunks {
        record_id: RecordId,
        total: u32,
        failures: Vec<ChunkFailure>,
    },
}

impl RemoteWriteError {
    /// Indices of the rejected chunks, in index order.
    pub fn failed_chunks(&self) -> Vec<u32> {
        match self {
            Self::CreateRecord(_) => Vec::new(),
            Self::Chunks { failures, .. } => {
                let mut indices: Vec<u32> = failures.iter().map(|f| f.index).collect();
                indices.sort_unstable();
                indices
            }
        }
    }
}

/// Thumbnail store failure. Logged by the orchestrator, never propagated.
#[derive(Debug, thiserror::Error)]
#[error("unable to store thumbnail for {record_id}: {source}")]
pub struct ThumbnailError {
    pub record_id: RecordId,
    #[source]
    pub source: BackendError,
}

/// Errors that abort an upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("configuration error: {0}")]
    Configuration(#[source] TransferError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    RemoteWrite(#[from] RemoteWriteError),

    /// All writes were acknowledged but the record cannot be read back.
    #[error("record verification failed: {record_id} is absent after upload")]
    Verification { record_id: RecordId },

    #[error("verification read for {record_id} failed: {source}")]
    RemoteRead {
        record_id: RecordId,
        #[source]
        source: BackendError,
    },
}

impl UploadError {
    pub fn is_remote_write(&self) -> bool {
        matches!(self, Self::RemoteWrite(_))
    }

    pub fn is_verification(&self) -> bool {
        matches!(self, Self::Verification { .. })
    }
}

/// Errors loading or saving [`UploaderConfig`](crate::UploaderConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}
