//! Thumbnail side channel.
//!
//! Storing the thumbnail is best effort: a failure is reported as a
//! [`ThumbnailError`] for the caller to log, and the upload carries on.

use clipvault_protocol::RecordId;
use clipvault_transfer::MediaBlob;
use tracing::debug;

use crate::backend::MediaBackend;
use crate::error::ThumbnailError;

/// Produces the thumbnail picture for a blob.
///
/// No frame is extracted; the result is an empty picture, which the
/// backend stores as "no thumbnail".
pub fn generate_thumbnail(blob: &MediaBlob) -> Vec<u8> {
    debug!(name = %blob.name(), "generating thumbnail");
    Vec::new()
}

/// Submits a thumbnail for `record_id`.
pub async fn store_thumbnail(
    backend: &dyn MediaBackend,
    record_id: &RecordId,
    pic: Vec<u8>,
) -> Result<(), ThumbnailError> {
    backend
        .put_thumbnail(record_id, pic)
        .await
        .map_err(|source| ThumbnailError {
            record_id: record_id.clone(),
            source,
        })
}
