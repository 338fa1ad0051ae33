use std::num::NonZeroU64;
use std::ops::Range;

use crate::{DEFAULT_CHUNK_SIZE, TransferError};

/// Maximum number of bytes carried by a single chunk.
///
/// Always positive. Configure it once per process and hand the same value
/// to every partitioning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkSize(NonZeroU64);

impl ChunkSize {
    /// Validates a raw byte count. Zero is a fatal misconfiguration.
    pub fn new(bytes: u64) -> Result<Self, TransferError> {
        NonZeroU64::new(bytes)
            .map(Self)
            .ok_or(TransferError::InvalidChunkSize(bytes))
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self(NonZeroU64::new(DEFAULT_CHUNK_SIZE).unwrap_or(NonZeroU64::MIN))
    }
}

/// Location of one chunk inside a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// 1-based sequential index.
    pub index: u32,
    /// First byte of the chunk.
    pub byte_start: u64,
    /// One past the last byte of the chunk.
    pub byte_end: u64,
}

impl ChunkDescriptor {
    /// Number of bytes in this chunk.
    pub fn len(&self) -> u64 {
        self.byte_end - self.byte_start
    }

    pub fn is_empty(&self) -> bool {
        self.byte_start == self.byte_end
    }

    /// The chunk's byte range, for slicing an in-memory buffer.
    pub fn as_range(&self) -> Range<usize> {
        self.byte_start as usize..self.byte_end as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_chunk_size_rejected() {
        let err = ChunkSize::new(0).unwrap_err();
        assert!(matches!(err, TransferError::InvalidChunkSize(0)));
    }

    #[test]
    fn default_chunk_size_matches_constant() {
        assert_eq!(ChunkSize::default().get(), DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn descriptor_len_and_range() {
        let d = ChunkDescriptor {
            index: 2,
            byte_start: 4,
            byte_end: 10,
        };
        assert_eq!(d.len(), 6);
        assert!(!d.is_empty());
        assert_eq!(d.as_range(), 4..10);
    }
}
