use serde::{Deserialize, Serialize};

use crate::types::{Album, AlbumInfo, ChunkPayload, RecordId, RecordInfo, RecordInit};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Creates a record. Must precede every chunk write for that record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVideoRequest {
    pub init: RecordInit,
}

/// Appends one chunk to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutVideoChunkRequest {
    pub video_id: RecordId,
    /// 1-based chunk index.
    pub chunk_num: u32,
    pub chunk: ChunkPayload,
}

/// Stores the thumbnail of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutVideoPicRequest {
    pub video_id: RecordId,
    pub pic: ChunkPayload,
}

/// Reads a record back from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVideoInfoRequest {
    pub user_id: String,
    pub video_id: RecordId,
}

/// Lists records or albums owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub user_id: String,
}

/// Creates an album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    pub name: String,
    pub info: AlbumInfo,
    pub user_id: String,
}

/// Adds an existing record to an album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVideoToAlbumRequest {
    pub album: String,
    pub video_id: RecordId,
    pub user_id: String,
}

/// Shares a record with another user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareVideoRequest {
    pub video_id: RecordId,
    pub target_user_id: String,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoResponse {
    pub video_id: RecordId,
}

/// Response to a record read. `video` is `None` when the backend has no
/// complete record under that id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfoResponse {
    #[serde(default)]
    pub video: Option<RecordInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileVideosResponse {
    #[serde(default)]
    pub videos: Vec<RecordInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAlbumsResponse {
    #[serde(default)]
    pub albums: Vec<Album>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumResponse {
    #[serde(default)]
    pub album: Option<Album>,
}
