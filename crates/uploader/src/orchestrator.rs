//! Upload orchestrator.
//!
//! Runs one upload end to end:
//! 1. Create the record (awaited; chunk writes need its id)
//! 2. Store the thumbnail (best effort)
//! 3. Issue every chunk write, then wait for all of them to settle
//! 4. Read the record back to verify the backend holds it
//!
//! A rejected chunk write is not retried. Every chunk write still runs to
//! completion so the error lists all rejected indices, not just the first.

use std::sync::Arc;

use clipvault_protocol::{RecordId, RecordInfo};
use clipvault_transfer::{ChunkDescriptor, ChunkPlan, ChunkProgress, ChunkSize, MediaBlob, encode_chunk};
use futures_util::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::backend::MediaBackend;
use crate::config::UploaderConfig;
use crate::error::{ChunkFailure, RemoteWriteError, UploadError};
use crate::metadata::UploadMetadata;
use crate::record::{build_record_init, current_time_nanos};
use crate::thumbnail::{generate_thumbnail, store_thumbnail};
use crate::types::UploadEvent;

/// Drives uploads against a [`MediaBackend`].
#[derive(Clone)]
pub struct Uploader {
    backend: Arc<dyn MediaBackend>,
    chunk_size: ChunkSize,
    events_tx: Option<mpsc::Sender<UploadEvent>>,
}

impl Uploader {
    pub fn new(backend: Arc<dyn MediaBackend>, chunk_size: ChunkSize) -> Self {
        Self {
            backend,
            chunk_size,
            events_tx: None,
        }
    }

    /// Builds an uploader with the configured chunk size.
    ///
    /// A non-positive chunk size is a [`UploadError::Configuration`] error.
    pub fn from_config(
        backend: Arc<dyn MediaBackend>,
        config: &UploaderConfig,
    ) -> Result<Self, UploadError> {
        let chunk_size = config.chunk_size().map_err(UploadError::Configuration)?;
        Ok(Self::new(backend, chunk_size))
    }

    /// Emits [`UploadEvent`]s on `events_tx`.
    ///
    /// Events are sent with `try_send`: when the buffer is full they are
    /// dropped rather than stalling the upload.
    pub fn with_events(mut self, events_tx: mpsc::Sender<UploadEvent>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    pub fn backend(&self) -> &dyn MediaBackend {
        self.backend.as_ref()
    }

    /// Uploads `blob` and returns the record as the backend stores it.
    pub async fn upload(
        &self,
        user_id: &str,
        blob: &MediaBlob,
        caption: &str,
        external_id: &str,
        metadata: &UploadMetadata,
    ) -> Result<RecordInfo, UploadError> {
        match self.run(user_id, blob, caption, external_id, metadata).await {
            Ok(info) => Ok(info),
            Err(e) => {
                self.emit(UploadEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        user_id: &str,
        blob: &MediaBlob,
        caption: &str,
        external_id: &str,
        metadata: &UploadMetadata,
    ) -> Result<RecordInfo, UploadError> {
        info!(user = %user_id, name = %blob.name(), bytes = blob.len(), "upload started");

        // The same plan feeds the announced chunk count and the chunk loop.
        let plan = ChunkPlan::new(blob.len(), self.chunk_size)?;
        let init = build_record_init(
            user_id,
            blob,
            &plan,
            caption,
            external_id,
            metadata,
            current_time_nanos(),
        );

        // 1. Create record
        let record_id = self
            .backend
            .create_record(&init)
            .await
            .map_err(RemoteWriteError::CreateRecord)?;
        info!(record_id = %record_id, chunks = plan.chunk_count(), "record created");
        self.emit(UploadEvent::RecordCreated {
            record_id: record_id.clone(),
            chunk_count: plan.chunk_count(),
        });

        // 2. Thumbnail
        self.send_thumbnail(&record_id, blob).await;

        // 3. Chunks
        self.put_chunks(&record_id, blob, &plan).await?;
        debug!(record_id = %record_id, "all chunk writes settled");

        // 4. Verify
        self.verify(user_id, &record_id).await
    }

    async fn send_thumbnail(&self, record_id: &RecordId, blob: &MediaBlob) {
        let pic = generate_thumbnail(blob);
        match store_thumbnail(self.backend.as_ref(), record_id, pic).await {
            Ok(()) => {
                debug!(record_id = %record_id, "thumbnail stored");
                self.emit(UploadEvent::ThumbnailStored {
                    record_id: record_id.clone(),
                });
            }
            Err(e) => {
                warn!(record_id = %record_id, error = %e, "failed to store thumbnail");
                self.emit(UploadEvent::ThumbnailSkipped {
                    record_id: record_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    /// Issues every chunk write and waits for all of them.
    async fn put_chunks(
        &self,
        record_id: &RecordId,
        blob: &MediaBlob,
        plan: &ChunkPlan,
    ) -> Result<(), RemoteWriteError> {
        let progress = ChunkProgress::new(plan.chunk_count(), plan.blob_len());
        let writes = plan
            .iter()
            .map(|chunk| self.put_chunk(record_id, blob, chunk, &progress));

        let failures: Vec<ChunkFailure> = join_all(writes)
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RemoteWriteError::Chunks {
                record_id: record_id.clone(),
                total: plan.chunk_count(),
                failures,
            })
        }
    }

    async fn put_chunk(
        &self,
        record_id: &RecordId,
        blob: &MediaBlob,
        chunk: ChunkDescriptor,
        progress: &ChunkProgress,
    ) -> Result<(), ChunkFailure> {
        let payload = encode_chunk(&blob.slice(&chunk));
        debug!(
            record_id = %record_id,
            chunk = chunk.index,
            start = chunk.byte_start,
            end = chunk.byte_end,
            "putting chunk"
        );

        if let Err(source) = self.backend.put_chunk(record_id, chunk.index, payload).await {
            warn!(record_id = %record_id, chunk = chunk.index, error = %source, "chunk write rejected");
            return Err(ChunkFailure {
                index: chunk.index,
                source,
            });
        }

        let snapshot = progress.acknowledge(chunk.len());
        self.emit(UploadEvent::ChunkAcknowledged {
            record_id: record_id.clone(),
            index: chunk.index,
            acknowledged: snapshot.acknowledged,
            total: snapshot.total_chunks,
            progress: snapshot.fraction(),
            bytes_per_second: snapshot.bytes_per_second(),
        });
        Ok(())
    }

    async fn verify(&self, user_id: &str, record_id: &RecordId) -> Result<RecordInfo, UploadError> {
        debug!(record_id = %record_id, "verifying record");
        let record = self
            .backend
            .get_record(user_id, record_id)
            .await
            .map_err(|source| UploadError::RemoteRead {
                record_id: record_id.clone(),
                source,
            })?;

        let Some(info) = record else {
            return Err(UploadError::Verification {
                record_id: record_id.clone(),
            });
        };

        info!(record_id = %record_id, "upload verified");
        self.emit(UploadEvent::Verified {
            record_id: record_id.clone(),
        });
        Ok(info)
    }

    fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.events_tx {
            let _ = tx.try_send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendFuture;
    use crate::error::BackendError;
    use crate::memory::MemoryBackend;
    use clipvault_protocol::{Album, AlbumInfo, ChunkPayload, RecordInit};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Barrier;

    /// Delegates to a `MemoryBackend` and records every call in issue order.
    struct RecordingBackend {
        inner: MemoryBackend,
        calls: Mutex<Vec<String>>,
        chunk_barrier: Option<Arc<Barrier>>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                inner: MemoryBackend::new(),
                calls: Mutex::new(Vec::new()),
                chunk_barrier: None,
            }
        }

        /// Every chunk write blocks until `n` chunk writes are in flight.
        fn with_chunk_barrier(mut self, n: usize) -> Self {
            self.chunk_barrier = Some(Arc::new(Barrier::new(n)));
            self
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls().iter().filter(|c| c.starts_with(prefix)).count()
        }
    }

    impl MediaBackend for RecordingBackend {
        fn create_record<'a>(&'a self, init: &'a RecordInit) -> BackendFuture<'a, RecordId> {
            self.log("create".into());
            self.inner.create_record(init)
        }

        fn put_chunk<'a>(
            &'a self,
            record_id: &'a RecordId,
            index: u32,
            payload: ChunkPayload,
        ) -> BackendFuture<'a, ()> {
            self.log(format!("put_chunk:{index}:{}", payload.len()));
            let barrier = self.chunk_barrier.clone();
            Box::pin(async move {
                if let Some(b) = barrier {
                    b.wait().await;
                }
                let result = self.inner.put_chunk(record_id, index, payload).await;
                self.log(format!("chunk_done:{index}"));
                result
            })
        }

        fn put_thumbnail<'a>(
            &'a self,
            record_id: &'a RecordId,
            pic: Vec<u8>,
        ) -> BackendFuture<'a, ()> {
            self.log("thumbnail".into());
            self.inner.put_thumbnail(record_id, pic)
        }

        fn get_record<'a>(
            &'a self,
            user_id: &'a str,
            record_id: &'a RecordId,
        ) -> BackendFuture<'a, Option<RecordInfo>> {
            self.log("get_record".into());
            self.inner.get_record(user_id, record_id)
        }

        fn get_profile_videos<'a>(&'a self, user_id: &'a str) -> BackendFuture<'a, Vec<RecordInfo>> {
            self.inner.get_profile_videos(user_id)
        }

        fn get_profile_albums<'a>(&'a self, user_id: &'a str) -> BackendFuture<'a, Vec<Album>> {
            self.inner.get_profile_albums(user_id)
        }

        fn create_album<'a>(
            &'a self,
            name: &'a str,
            info: &'a AlbumInfo,
            user_id: &'a str,
        ) -> BackendFuture<'a, Option<Album>> {
            self.inner.create_album(name, info, user_id)
        }

        fn add_video_to_album<'a>(
            &'a self,
            album: &'a str,
            video_id: &'a RecordId,
            user_id: &'a str,
        ) -> BackendFuture<'a, Option<Album>> {
            self.inner.add_video_to_album(album, video_id, user_id)
        }

        fn share_video<'a>(
            &'a self,
            video_id: &'a RecordId,
            target_user_id: &'a str,
        ) -> BackendFuture<'a, Option<RecordInfo>> {
            self.inner.share_video(video_id, target_user_id)
        }
    }

    fn uploader(backend: &Arc<RecordingBackend>, chunk: u64) -> Uploader {
        let backend: Arc<dyn MediaBackend> = backend.clone();
        Uploader::new(backend, ChunkSize::new(chunk).unwrap())
    }

    fn blob(len: usize) -> MediaBlob {
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        MediaBlob::new("clip.mp4", data)
    }

    #[tokio::test]
    async fn upload_full_pipeline() {
        let backend = Arc::new(RecordingBackend::new());
        let (tx, mut rx) = mpsc::channel(64);
        let up = uploader(&backend, 4).with_events(tx);
        let b = blob(10);

        let info = up
            .upload("alice", &b, "Sunset #beach", "ext-1", &UploadMetadata::default())
            .await
            .unwrap();

        assert_eq!(info.chunk_count, 3);
        assert_eq!(info.name, "clip");
        assert_eq!(info.tags, vec!["#beach"]);
        assert_eq!(info.external_id, "ext-1");
        assert_eq!(backend.inner.assemble(&info.video_id).unwrap(), b.bytes().to_vec());
        assert_eq!(backend.inner.thumbnail(&info.video_id), Some(Vec::new()));

        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        assert!(matches!(events[0], UploadEvent::RecordCreated { chunk_count: 3, .. }));
        assert!(matches!(events[1], UploadEvent::ThumbnailStored { .. }));
        let acks: Vec<&UploadEvent> = events
            .iter()
            .filter(|e| matches!(e, UploadEvent::ChunkAcknowledged { .. }))
            .collect();
        assert_eq!(acks.len(), 3);
        for ack in &acks {
            let UploadEvent::ChunkAcknowledged {
                bytes_per_second, ..
            } = ack
            else {
                unreachable!();
            };
            assert!(*bytes_per_second >= 0.0);
        }
        assert!(matches!(
            acks.last(),
            Some(UploadEvent::ChunkAcknowledged { acknowledged: 3, total: 3, progress, .. }) if *progress == 1.0
        ));
        assert!(matches!(events.last(), Some(UploadEvent::Verified { .. })));
    }

    #[tokio::test]
    async fn calls_are_ordered_around_chunk_fan_out() {
        let backend = Arc::new(RecordingBackend::new());
        let up = uploader(&backend, 4);
        up.upload("alice", &blob(10), "", "x", &UploadMetadata::default())
            .await
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls[0], "create");
        assert_eq!(calls[1], "thumbnail");
        assert_eq!(calls.last().unwrap(), "get_record");
        assert_eq!(backend.count("put_chunk"), 3);
        assert_eq!(backend.count("chunk_done"), 3);
    }

    #[tokio::test]
    async fn chunk_writes_issued_before_any_completes() {
        // Each write waits until all three are in flight; sequential
        // dispatch would never get past the first one.
        let backend = Arc::new(RecordingBackend::new().with_chunk_barrier(3));
        let up = uploader(&backend, 3_900_000);
        let b = blob(10_000_000);

        let info = tokio::time::timeout(
            Duration::from_secs(10),
            up.upload("alice", &b, "", "x", &UploadMetadata::default()),
        )
        .await
        .expect("chunk writes must run concurrently")
        .unwrap();
        assert_eq!(info.chunk_count, 3);

        let calls = backend.calls();
        let chunk_calls: Vec<&String> = calls
            .iter()
            .filter(|c| c.starts_with("put_chunk") || c.starts_with("chunk_done"))
            .collect();
        assert_eq!(chunk_calls[0], "put_chunk:1:3900000");
        assert_eq!(chunk_calls[1], "put_chunk:2:3900000");
        assert_eq!(chunk_calls[2], "put_chunk:3:2200000");
        assert!(chunk_calls[3..].iter().all(|c| c.starts_with("chunk_done")));
        assert_eq!(backend.count("get_record"), 1);
    }

    #[tokio::test]
    async fn rejected_chunk_fails_without_verification() {
        let backend = Arc::new(RecordingBackend::new());
        backend.inner.reject_chunk(2);
        let up = uploader(&backend, 4);

        let err = up
            .upload("alice", &blob(10), "", "x", &UploadMetadata::default())
            .await
            .unwrap_err();

        assert!(err.is_remote_write());
        match err {
            UploadError::RemoteWrite(w) => assert_eq!(w.failed_chunks(), vec![2]),
            other => panic!("expected RemoteWrite, got {other:?}"),
        }
        assert_eq!(backend.count("get_record"), 0);
        // The other writes still ran to completion.
        assert_eq!(backend.count("chunk_done"), 3);
    }

    #[tokio::test]
    async fn every_rejected_chunk_is_reported() {
        let backend = Arc::new(RecordingBackend::new());
        backend.inner.reject_chunk(1);
        backend.inner.reject_chunk(3);
        let up = uploader(&backend, 4);

        let err = up
            .upload("alice", &blob(10), "", "x", &UploadMetadata::default())
            .await
            .unwrap_err();

        let UploadError::RemoteWrite(w) = err else {
            panic!("expected RemoteWrite");
        };
        assert_eq!(w.failed_chunks(), vec![1, 3]);
        // The record stays on the backend with only chunk 2.
        assert_eq!(backend.inner.record_count(), 1);
        let RemoteWriteError::Chunks { record_id, .. } = &w else {
            panic!("expected chunk failures");
        };
        assert_eq!(backend.inner.stored_chunks(record_id), 1);
        assert!(backend.inner.assemble(record_id).is_none());
    }

    #[tokio::test]
    async fn absent_record_is_verification_error() {
        let backend = Arc::new(RecordingBackend::new());
        backend.inner.hide_records(true);
        let (tx, mut rx) = mpsc::channel(64);
        let up = uploader(&backend, 4).with_events(tx);

        let err = up
            .upload("alice", &blob(10), "", "x", &UploadMetadata::default())
            .await
            .unwrap_err();

        assert!(err.is_verification());
        assert!(!err.is_remote_write());
        assert_eq!(backend.count("chunk_done"), 3);

        let mut last = None;
        while let Ok(e) = rx.try_recv() {
            last = Some(e);
        }
        assert!(matches!(last, Some(UploadEvent::Failed { .. })));
    }

    #[tokio::test]
    async fn thumbnail_failure_is_not_fatal() {
        let backend = Arc::new(RecordingBackend::new());
        backend.inner.reject_thumbnails(true);
        let (tx, mut rx) = mpsc::channel(64);
        let up = uploader(&backend, 4).with_events(tx);

        let info = up
            .upload("alice", &blob(10), "", "x", &UploadMetadata::default())
            .await
            .unwrap();
        assert_eq!(info.chunk_count, 3);

        let mut skipped = false;
        while let Ok(e) = rx.try_recv() {
            skipped |= matches!(e, UploadEvent::ThumbnailSkipped { .. });
        }
        assert!(skipped);
    }

    #[tokio::test]
    async fn create_rejection_stops_before_chunks() {
        let backend = Arc::new(RecordingBackend::new());
        backend.inner.reject_create(true);
        let up = uploader(&backend, 4);

        let err = up
            .upload("alice", &blob(10), "", "x", &UploadMetadata::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::RemoteWrite(RemoteWriteError::CreateRecord(BackendError::Rejected { .. }))
        ));
        assert_eq!(backend.calls(), vec!["create".to_string()]);
    }

    #[tokio::test]
    async fn empty_blob_writes_no_chunks() {
        let backend = Arc::new(RecordingBackend::new());
        let up = uploader(&backend, 4);

        let info = up
            .upload("alice", &blob(0), "", "x", &UploadMetadata::default())
            .await
            .unwrap();

        assert_eq!(info.chunk_count, 0);
        assert_eq!(backend.count("put_chunk"), 0);
        assert_eq!(backend.count("get_record"), 1);
    }

    #[test]
    fn zero_chunk_size_in_config_is_configuration_error() {
        let backend: Arc<dyn MediaBackend> = Arc::new(MemoryBackend::new());
        let config = UploaderConfig {
            chunk_size: 0,
            ..Default::default()
        };
        let err = Uploader::from_config(backend, &config).err().unwrap();
        assert!(matches!(err, UploadError::Configuration(_)));
    }
}
