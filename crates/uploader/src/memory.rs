//! In-process backend for dry runs and tests.
//!
//! Honors the append-only contract: a chunk index can be written once,
//! only for an existing record, and a record becomes readable only after
//! every announced chunk has arrived.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use clipvault_protocol::{Album, AlbumInfo, ChunkPayload, RecordId, RecordInfo, RecordInit};
use tracing::debug;

use crate::backend::{BackendFuture, MediaBackend};
use crate::error::BackendError;
use crate::record::current_time_nanos;

/// Rejection code for requests that violate the write contract.
const CODE_CONFLICT: i32 = 409;
/// Rejection code for unknown records or albums.
const CODE_NOT_FOUND: i32 = 404;
/// Rejection code for injected faults.
const CODE_INJECTED: i32 = 503;

struct StoredRecord {
    init: RecordInit,
    chunks: BTreeMap<u32, Vec<u8>>,
    thumbnail: Option<Vec<u8>>,
    shared_with: Vec<String>,
    uploaded_at: i64,
}

impl StoredRecord {
    fn is_complete(&self) -> bool {
        self.chunks.len() as u32 == self.init.chunk_count
    }

    fn info(&self, record_id: &RecordId) -> RecordInfo {
        RecordInfo {
            video_id: record_id.clone(),
            user_id: self.init.user_id.clone(),
            external_id: self.init.external_id.clone(),
            name: self.init.name.clone(),
            caption: self.init.caption.clone(),
            tags: self.init.tags.clone(),
            chunk_count: self.init.chunk_count,
            created_at: self.init.created_at,
            uploaded_at: self.uploaded_at,
            last_modified_at: self.init.last_modified_at.clone(),
            geo_data: self.init.geo_data.clone(),
            people: self.init.people.clone(),
            album: self.init.album.clone(),
            view_count: self.init.view_count,
            shared_with: self.shared_with.clone(),
        }
    }
}

#[derive(Default)]
struct Faults {
    reject_create: bool,
    reject_thumbnails: bool,
    reject_chunks: HashSet<u32>,
    hide_records: bool,
}

#[derive(Default)]
struct Store {
    next_id: u64,
    records: HashMap<RecordId, StoredRecord>,
    albums: HashMap<String, Album>,
    faults: Faults,
}

/// Backend that keeps everything in memory.
#[derive(Default)]
pub struct MemoryBackend {
    store: Mutex<Store>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store, ignoring poisoning.
    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rejects every record creation.
    pub fn reject_create(&self, reject: bool) {
        self.store().faults.reject_create = reject;
    }

    /// Rejects every thumbnail store.
    pub fn reject_thumbnails(&self, reject: bool) {
        self.store().faults.reject_thumbnails = reject;
    }

    /// Rejects writes of chunk `index` for every record.
    pub fn reject_chunk(&self, index: u32) {
        self.store().faults.reject_chunks.insert(index);
    }

    /// Makes every record read return absent.
    pub fn hide_records(&self, hide: bool) {
        self.store().faults.hide_records = hide;
    }

    pub fn record_count(&self) -> usize {
        self.store().records.len()
    }

    /// Number of chunks stored for a record.
    pub fn stored_chunks(&self, record_id: &RecordId) -> usize {
        let store = self.store();
        store.records.get(record_id).map_or(0, |r| r.chunks.len())
    }

    /// Thumbnail stored for a record, if any.
    pub fn thumbnail(&self, record_id: &RecordId) -> Option<Vec<u8>> {
        let store = self.store();
        store.records.get(record_id).and_then(|r| r.thumbnail.clone())
    }

    /// Concatenates the stored chunks of a complete record in index order.
    pub fn assemble(&self, record_id: &RecordId) -> Option<Vec<u8>> {
        let store = self.store();
        let record = store.records.get(record_id)?;
        if !record.is_complete() {
            return None;
        }
        Some(record.chunks.values().flatten().copied().collect())
    }

    fn create_record_sync(&self, init: &RecordInit) -> Result<RecordId, BackendError> {
        let mut store = self.store();
        if store.faults.reject_create {
            return Err(BackendError::rejected(CODE_INJECTED, "record creation disabled"));
        }
        store.next_id += 1;
        let record_id = RecordId::new(format!("{}-{}", init.user_id, store.next_id));
        store.records.insert(
            record_id.clone(),
            StoredRecord {
                init: init.clone(),
                chunks: BTreeMap::new(),
                thumbnail: None,
                shared_with: Vec::new(),
                uploaded_at: current_time_nanos(),
            },
        );
        debug!(record_id = %record_id, chunks = init.chunk_count, "record created");
        Ok(record_id)
    }

    fn put_chunk_sync(
        &self,
        record_id: &RecordId,
        index: u32,
        payload: ChunkPayload,
    ) -> Result<(), BackendError> {
        let mut store = self.store();
        if store.faults.reject_chunks.contains(&index) {
            return Err(BackendError::rejected(
                CODE_INJECTED,
                format!("chunk {index} rejected"),
            ));
        }
        let record = store
            .records
            .get_mut(record_id)
            .ok_or_else(|| BackendError::rejected(CODE_NOT_FOUND, format!("no record {record_id}")))?;
        if index == 0 || index > record.init.chunk_count {
            return Err(BackendError::rejected(
                CODE_CONFLICT,
                format!("chunk {index} outside 1..={}", record.init.chunk_count),
            ));
        }
        if record.chunks.contains_key(&index) {
            return Err(BackendError::rejected(
                CODE_CONFLICT,
                format!("chunk {index} already written"),
            ));
        }
        record.chunks.insert(index, payload.into_bytes());
        Ok(())
    }

    fn put_thumbnail_sync(&self, record_id: &RecordId, pic: Vec<u8>) -> Result<(), BackendError> {
        let mut store = self.store();
        if store.faults.reject_thumbnails {
            return Err(BackendError::rejected(CODE_INJECTED, "thumbnails disabled"));
        }
        let record = store
            .records
            .get_mut(record_id)
            .ok_or_else(|| BackendError::rejected(CODE_NOT_FOUND, format!("no record {record_id}")))?;
        record.thumbnail = Some(pic);
        Ok(())
    }

    fn get_record_sync(&self, user_id: &str, record_id: &RecordId) -> Option<RecordInfo> {
        let store = self.store();
        if store.faults.hide_records {
            return None;
        }
        let record = store.records.get(record_id)?;
        let visible =
            record.init.user_id == user_id || record.shared_with.iter().any(|u| u == user_id);
        (visible && record.is_complete()).then(|| record.info(record_id))
    }

    fn profile_videos_sync(&self, user_id: &str) -> Vec<RecordInfo> {
        let store = self.store();
        let mut videos: Vec<RecordInfo> = store
            .records
            .iter()
            .filter(|(_, r)| r.is_complete())
            .filter(|(_, r)| r.init.user_id == user_id || r.shared_with.iter().any(|u| u == user_id))
            .map(|(id, r)| r.info(id))
            .collect();
        videos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.video_id.cmp(&b.video_id)));
        videos
    }

    fn profile_albums_sync(&self, user_id: &str) -> Vec<Album> {
        let store = self.store();
        let mut albums: Vec<Album> = store
            .albums
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        albums.sort_by(|a, b| a.album_id.cmp(&b.album_id));
        albums
    }

    fn create_album_sync(&self, name: &str, info: &AlbumInfo, user_id: &str) -> Option<Album> {
        let mut store = self.store();
        store.next_id += 1;
        let album = Album {
            album_id: format!("{user_id}-album-{}", store.next_id),
            user_id: user_id.to_string(),
            info: AlbumInfo {
                name: name.to_string(),
                ..info.clone()
            },
            videos: Vec::new(),
        };
        store.albums.insert(album.album_id.clone(), album.clone());
        Some(album)
    }

    fn add_video_to_album_sync(
        &self,
        album_id: &str,
        video_id: &RecordId,
        user_id: &str,
    ) -> Result<Option<Album>, BackendError> {
        let mut guard = self.store();
        let store = &mut *guard;
        let Some(record) = store.records.get_mut(video_id) else {
            return Err(BackendError::rejected(CODE_NOT_FOUND, format!("no record {video_id}")));
        };
        let Some(album) = store.albums.get_mut(album_id) else {
            return Ok(None);
        };
        if album.user_id != user_id {
            return Err(BackendError::rejected(CODE_CONFLICT, "album belongs to another user"));
        }
        record.init.album = vec![album_id.to_string()];
        if !album.videos.contains(video_id) {
            album.videos.push(video_id.clone());
        }
        Ok(Some(album.clone()))
    }

    fn share_video_sync(&self, video_id: &RecordId, target_user_id: &str) -> Option<RecordInfo> {
        let mut store = self.store();
        let record = store.records.get_mut(video_id)?;
        if !record.shared_with.iter().any(|u| u == target_user_id) {
            record.shared_with.push(target_user_id.to_string());
        }
        Some(record.info(video_id))
    }
}

impl MediaBackend for MemoryBackend {
    fn create_record<'a>(&'a self, init: &'a RecordInit) -> BackendFuture<'a, RecordId> {
        Box::pin(async move { self.create_record_sync(init) })
    }

    fn put_chunk<'a>(
        &'a self,
        record_id: &'a RecordId,
        index: u32,
        payload: ChunkPayload,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move { self.put_chunk_sync(record_id, index, payload) })
    }

    fn put_thumbnail<'a>(
        &'a self,
        record_id: &'a RecordId,
        pic: Vec<u8>,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move { self.put_thumbnail_sync(record_id, pic) })
    }

    fn get_record<'a>(
        &'a self,
        user_id: &'a str,
        record_id: &'a RecordId,
    ) -> BackendFuture<'a, Option<RecordInfo>> {
        Box::pin(async move { Ok(self.get_record_sync(user_id, record_id)) })
    }

    fn get_profile_videos<'a>(&'a self, user_id: &'a str) -> BackendFuture<'a, Vec<RecordInfo>> {
        Box::pin(async move { Ok(self.profile_videos_sync(user_id)) })
    }

    fn get_profile_albums<'a>(&'a self, user_id: &'a str) -> BackendFuture<'a, Vec<Album>> {
        Box::pin(async move { Ok(self.profile_albums_sync(user_id)) })
    }

    fn create_album<'a>(
        &'a self,
        name: &'a str,
        info: &'a AlbumInfo,
        user_id: &'a str,
    ) -> BackendFuture<'a, Option<Album>> {
        Box::pin(async move { Ok(self.create_album_sync(name, info, user_id)) })
    }

    fn add_video_to_album<'a>(
        &'a self,
        album: &'a str,
        video_id: &'a RecordId,
        user_id: &'a str,
    ) -> BackendFuture<'a, Option<Album>> {
        Box::pin(async move { self.add_video_to_album_sync(album, video_id, user_id) })
    }

    fn share_video<'a>(
        &'a self,
        video_id: &'a RecordId,
        target_user_id: &'a str,
    ) -> BackendFuture<'a, Option<RecordInfo>> {
        Box::pin(async move { Ok(self.share_video_sync(video_id, target_user_id)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(user: &str, chunks: u32) -> RecordInit {
        RecordInit {
            user_id: user.into(),
            external_id: "ext".into(),
            name: "clip".into(),
            caption: String::new(),
            tags: vec![],
            chunk_count: chunks,
            created_at: 1,
            last_modified_at: vec![],
            geo_data: vec![],
            geo_data_exif: vec![],
            people: vec![],
            uploaded_from: vec![],
            album: vec![],
            view_count: 0,
        }
    }

    #[tokio::test]
    async fn record_readable_only_when_complete() {
        let backend = MemoryBackend::new();
        let init = init("alice", 2);
        let id = backend.create_record(&init).await.unwrap();

        backend.put_chunk(&id, 1, ChunkPayload::new(vec![1])).await.unwrap();
        assert!(backend.get_record("alice", &id).await.unwrap().is_none());

        backend.put_chunk(&id, 2, ChunkPayload::new(vec![2])).await.unwrap();
        let info = backend.get_record("alice", &id).await.unwrap().unwrap();
        assert_eq!(info.chunk_count, 2);
        assert_eq!(backend.assemble(&id).unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn chunks_are_append_only() {
        let backend = MemoryBackend::new();
        let init = init("alice", 1);
        let id = backend.create_record(&init).await.unwrap();
        backend.put_chunk(&id, 1, ChunkPayload::new(vec![1])).await.unwrap();

        let dup = backend.put_chunk(&id, 1, ChunkPayload::new(vec![9])).await;
        assert!(matches!(dup, Err(BackendError::Rejected { code: 409, .. })));

        let out_of_range = backend.put_chunk(&id, 2, ChunkPayload::new(vec![9])).await;
        assert!(out_of_range.is_err());

        let unknown = backend
            .put_chunk(&RecordId::from("nope"), 1, ChunkPayload::new(vec![]))
            .await;
        assert!(matches!(unknown, Err(BackendError::Rejected { code: 404, .. })));
    }

    #[tokio::test]
    async fn survives_a_poisoned_lock() {
        let backend = std::sync::Arc::new(MemoryBackend::new());
        let id = backend.create_record(&init("alice", 1)).await.unwrap();

        let poisoner = backend.clone();
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.store.lock().unwrap();
            panic!("poison the store");
        })
        .join();
        assert!(joined.is_err());
        assert!(backend.store.is_poisoned());

        backend.put_chunk(&id, 1, ChunkPayload::new(vec![5])).await.unwrap();
        assert_eq!(backend.stored_chunks(&id), 1);
        assert_eq!(backend.assemble(&id).unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn injected_faults() {
        let backend = MemoryBackend::new();
        backend.reject_create(true);
        let init = init("alice", 0);
        assert!(backend.create_record(&init).await.is_err());
        backend.reject_create(false);

        let id = backend.create_record(&init).await.unwrap();
        backend.reject_thumbnails(true);
        assert!(backend.put_thumbnail(&id, vec![]).await.is_err());

        backend.hide_records(true);
        assert!(backend.get_record("alice", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn other_users_cannot_read_unshared_records() {
        let backend = MemoryBackend::new();
        let id = backend.create_record(&init("alice", 0)).await.unwrap();
        assert!(backend.get_record("bob", &id).await.unwrap().is_none());

        backend.share_video(&id, "bob").await.unwrap();
        assert!(backend.get_record("bob", &id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn albums_collect_videos() {
        let backend = MemoryBackend::new();
        let id = backend.create_record(&init("alice", 0)).await.unwrap();
        let info = AlbumInfo {
            name: String::new(),
            description: "summer".into(),
            created_at: 0,
            is_private: false,
        };
        let album = backend
            .create_album("Trip", &info, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(album.info.name, "Trip");

        let updated = backend
            .add_video_to_album(&album.album_id, &id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.videos, vec![id.clone()]);

        let albums = backend.get_profile_albums("alice").await.unwrap();
        assert_eq!(albums.len(), 1);
        assert!(backend.get_profile_albums("bob").await.unwrap().is_empty());
    }
}
