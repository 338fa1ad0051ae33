use serde::{Deserialize, Serialize};

/// Identifier the backend assigns to a record on creation.
///
/// Opaque to clients; used to correlate chunk writes, the thumbnail and
/// the verification read with the record they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend-native chunk encoding: a sequence of byte-valued naturals.
///
/// Serializes as a JSON array of numbers (`[0, 255, ...]`), which is what
/// the backend's `vec nat8` arguments accept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkPayload(Vec<u8>);

impl ChunkPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// A geographic position attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoData {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

/// Creation payload for a new record.
///
/// Optional values are zero-or-one element vectors, never `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInit {
    pub user_id: String,
    pub external_id: String,
    pub name: String,
    pub caption: String,
    pub tags: Vec<String>,
    pub chunk_count: u32,
    /// Nanoseconds since the Unix epoch.
    pub created_at: i64,
    pub last_modified_at: Vec<i64>,
    pub geo_data: Vec<GeoData>,
    pub geo_data_exif: Vec<GeoData>,
    pub people: Vec<Vec<String>>,
    pub uploaded_from: Vec<String>,
    pub album: Vec<String>,
    pub view_count: u64,
}

/// The backend's stored view of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInfo {
    pub video_id: RecordId,
    pub user_id: String,
    #[serde(default)]
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub chunk_count: u32,
    pub created_at: i64,
    #[serde(default)]
    pub uploaded_at: i64,
    #[serde(default)]
    pub last_modified_at: Vec<i64>,
    #[serde(default)]
    pub geo_data: Vec<GeoData>,
    #[serde(default)]
    pub people: Vec<Vec<String>>,
    #[serde(default)]
    pub album: Vec<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with: Vec<String>,
}

/// Descriptive fields of an album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub is_private: bool,
}

/// An album as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub album_id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub info: AlbumInfo,
    #[serde(default)]
    pub videos: Vec<RecordId>,
}
