use std::path::Path;
use std::time::UNIX_EPOCH;

use bytes::Bytes;

use crate::TransferError;
use crate::types::ChunkDescriptor;

/// An immutable media payload selected for upload.
///
/// Cloning is cheap: the bytes are reference-counted and chunk slices
/// share the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    name: String,
    data: Bytes,
    last_modified_ms: Option<i64>,
}

impl MediaBlob {
    /// Wraps an in-memory buffer under the given declared file name.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            last_modified_ms: None,
        }
    }

    /// Attaches the file's last-modified time in milliseconds since the epoch.
    pub fn with_last_modified(mut self, millis: i64) -> Self {
        self.last_modified_ms = Some(millis);
        self
    }

    /// Reads a local file into memory.
    ///
    /// The declared name is the file name component of `path`; the file's
    /// modification time is recorded when the platform reports one.
    pub async fn from_path(path: &Path) -> Result<Self, TransferError> {
        let data = tokio::fs::read(path).await?;
        let last_modified_ms = tokio::fs::metadata(path)
            .await?
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .and_then(|d| i64::try_from(d.as_millis()).ok());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            data: Bytes::from(data),
            last_modified_ms,
        })
    }

    /// Declared file name, including its extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn last_modified_ms(&self) -> Option<i64> {
        self.last_modified_ms
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Zero-copy view of one chunk.
    ///
    /// The descriptor must come from a plan built for this blob's length.
    pub fn slice(&self, chunk: &ChunkDescriptor) -> Bytes {
        self.data.slice(chunk.as_range())
    }
}
