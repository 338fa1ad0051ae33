//! Structured free-form upload metadata.

use clipvault_protocol::GeoData;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Optional descriptive fields supplied alongside an upload.
///
/// Every field defaults to absent; `view_count` defaults to zero.
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadMetadata {
    /// Overrides the caption passed to the upload call when non-empty.
    pub caption: Option<String>,
    pub created_at: Option<i64>,
    pub last_modified_at: Option<i64>,
    pub geo_data: Option<GeoData>,
    pub geo_data_exif: Option<GeoData>,
    pub people: Option<Vec<String>>,
    pub uploaded_from: Option<String>,
    pub album: Option<String>,
    pub view_count: u64,
}

impl UploadMetadata {
    /// Parses metadata field by field, dropping fields that do not have the
    /// expected shape instead of failing.
    ///
    /// Non-object input yields the defaults.
    pub fn from_json_lenient(value: &serde_json::Value) -> Self {
        let Some(obj) = value.as_object() else {
            if !value.is_null() {
                debug!("metadata is not an object, using defaults");
            }
            return Self::default();
        };

        Self {
            caption: field(obj, "caption"),
            created_at: field(obj, "createdAt"),
            last_modified_at: field(obj, "lastModifiedAt"),
            geo_data: field(obj, "geoData"),
            geo_data_exif: field(obj, "geoDataExif"),
            people: field(obj, "people"),
            uploaded_from: field(obj, "uploadedFrom"),
            album: field(obj, "album"),
            view_count: field(obj, "viewCount").unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn field<T: DeserializeOwned>(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<T> {
    let value = obj.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(field = key, error = %e, "ignoring malformed metadata field");
            None
        }
    }
}
