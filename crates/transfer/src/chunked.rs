use std::ops::Range;

use crate::TransferError;
use crate::types::{ChunkDescriptor, ChunkSize};

// ---------------------------------------------------------------------------
// Pure partitioning
// ---------------------------------------------------------------------------

/// Number of chunks needed for `blob_len` bytes (ceiling division).
///
/// An empty blob has zero chunks.
pub fn chunk_count(blob_len: u64, chunk_size: ChunkSize) -> u64 {
    blob_len.div_ceil(chunk_size.get())
}

/// Byte range of the 1-based chunk `index`.
///
/// `start = (index - 1) * chunk_size`, `end = min(blob_len, start + chunk_size)`.
pub fn chunk_range(
    index: u32,
    blob_len: u64,
    chunk_size: ChunkSize,
) -> Result<Range<u64>, TransferError> {
    let count = chunk_count(blob_len, chunk_size);
    if index == 0 || u64::from(index) > count {
        return Err(TransferError::ChunkOutOfRange {
            index,
            count: u32::try_from(count).unwrap_or(u32::MAX),
        });
    }
    let start = u64::from(index - 1) * chunk_size.get();
    let end = blob_len.min(start.saturating_add(chunk_size.get()));
    Ok(start..end)
}

// ---------------------------------------------------------------------------
// ChunkPlan
// ---------------------------------------------------------------------------

/// Partition of one blob, computed once and shared by everything that needs
/// the chunk count or a chunk's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    blob_len: u64,
    chunk_size: ChunkSize,
    count: u32,
}

impl ChunkPlan {
    /// Plans the chunks of a `blob_len`-byte blob.
    pub fn new(blob_len: u64, chunk_size: ChunkSize) -> Result<Self, TransferError> {
        let count = u32::try_from(chunk_count(blob_len, chunk_size))
            .map_err(|_| TransferError::TooManyChunks { blob_len })?;
        Ok(Self {
            blob_len,
            chunk_size,
            count,
        })
    }

    pub fn chunk_count(&self) -> u32 {
        self.count
    }

    pub fn blob_len(&self) -> u64 {
        self.blob_len
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    /// Byte range of the 1-based chunk `index`.
    pub fn range(&self, index: u32) -> Result<Range<u64>, TransferError> {
        chunk_range(index, self.blob_len, self.chunk_size)
    }

    /// Returns the descriptor for the 1-based chunk `index`.
    pub fn descriptor(&self, index: u32) -> Result<ChunkDescriptor, TransferError> {
        let range = self.range(index)?;
        Ok(ChunkDescriptor {
            index,
            byte_start: range.start,
            byte_end: range.end,
        })
    }

    /// Iterates every chunk in index order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkDescriptor> + '_ {
        let size = self.chunk_size.get();
        (1..=self.count).map(move |index| {
            let byte_start = u64::from(index - 1) * size;
            ChunkDescriptor {
                index,
                byte_start,
                byte_end: self.blob_len.min(byte_start.saturating_add(size)),
            }
        })
    }
}
