use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counts acknowledged chunk writes across concurrently running futures.
///
/// Each chunk write records itself once on success; snapshots can be taken
/// from any task without locking.
#[derive(Debug)]
pub struct ChunkProgress {
    total_chunks: u32,
    total_bytes: u64,
    acknowledged: AtomicU32,
    acknowledged_bytes: AtomicU64,
    started_at: Instant,
}

/// Point-in-time view of a [`ChunkProgress`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub acknowledged: u32,
    pub total_chunks: u32,
    pub acknowledged_bytes: u64,
    pub total_bytes: u64,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Progress as a fraction in `0.0..=1.0`. An empty upload is complete.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        self.acknowledged_bytes as f64 / self.total_bytes as f64
    }

    /// Average throughput since the tracker was created.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.acknowledged_bytes as f64 / self.elapsed.as_secs_f64()
    }

    pub fn is_complete(&self) -> bool {
        self.acknowledged >= self.total_chunks
    }
}

impl ChunkProgress {
    pub fn new(total_chunks: u32, total_bytes: u64) -> Self {
        Self {
            total_chunks,
            total_bytes,
            acknowledged: AtomicU32::new(0),
            acknowledged_bytes: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Records one acknowledged chunk of `bytes` and returns the new totals.
    pub fn acknowledge(&self, bytes: u64) -> ProgressSnapshot {
        let acknowledged = self.acknowledged.fetch_add(1, Ordering::AcqRel) + 1;
        let acknowledged_bytes = self.acknowledged_bytes.fetch_add(bytes, Ordering::AcqRel) + bytes;
        ProgressSnapshot {
            acknowledged,
            total_chunks: self.total_chunks,
            acknowledged_bytes,
            total_bytes: self.total_bytes,
            elapsed: self.started_at.elapsed(),
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            acknowledged: self.acknowledged.load(Ordering::Acquire),
            total_chunks: self.total_chunks,
            acknowledged_bytes: self.acknowledged_bytes.load(Ordering::Acquire),
            total_bytes: self.total_bytes,
            elapsed: self.started_at.elapsed(),
        }
    }
}
