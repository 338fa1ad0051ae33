//! Remote backend trait.
//!
//! `MediaBackend` is implemented by the embedding application to bridge the
//! upload pipeline to the actual transport. Keeping it a trait keeps the
//! pipeline decoupled from the wire and testable with mocks.

use std::future::Future;
use std::pin::Pin;

use clipvault_protocol::{Album, AlbumInfo, ChunkPayload, RecordId, RecordInfo, RecordInit};

use crate::error::BackendError;

/// Boxed future returned by every backend call.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

/// Abstract connection to the append-only media backend.
pub trait MediaBackend: Send + Sync {
    /// Creates a record and returns the id the backend assigned to it.
    fn create_record<'a>(&'a self, init: &'a RecordInit) -> BackendFuture<'a, RecordId>;

    /// Appends chunk `index` (1-based) to a record.
    fn put_chunk<'a>(
        &'a self,
        record_id: &'a RecordId,
        index: u32,
        payload: ChunkPayload,
    ) -> BackendFuture<'a, ()>;

    /// Stores the thumbnail picture of a record.
    fn put_thumbnail<'a>(&'a self, record_id: &'a RecordId, pic: Vec<u8>)
    -> BackendFuture<'a, ()>;

    /// Reads a record. `None` means the backend has no complete record under this id.
    fn get_record<'a>(
        &'a self,
        user_id: &'a str,
        record_id: &'a RecordId,
    ) -> BackendFuture<'a, Option<RecordInfo>>;

    /// Lists the records visible on a user's profile.
    fn get_profile_videos<'a>(&'a self, user_id: &'a str) -> BackendFuture<'a, Vec<RecordInfo>>;

    /// Lists a user's albums.
    fn get_profile_albums<'a>(&'a self, user_id: &'a str) -> BackendFuture<'a, Vec<Album>>;

    fn create_album<'a>(
        &'a self,
        name: &'a str,
        info: &'a AlbumInfo,
        user_id: &'a str,
    ) -> BackendFuture<'a, Option<Album>>;

    fn add_video_to_album<'a>(
        &'a self,
        album: &'a str,
        video_id: &'a RecordId,
        user_id: &'a str,
    ) -> BackendFuture<'a, Option<Album>>;

    fn share_video<'a>(
        &'a self,
        video_id: &'a RecordId,
        target_user_id: &'a str,
    ) -> BackendFuture<'a, Option<RecordInfo>>;
}
