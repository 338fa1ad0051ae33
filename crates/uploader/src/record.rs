//! Record initializer: turns an upload intent into the backend creation payload.

use std::sync::LazyLock;

use clipvault_protocol::RecordInit;
use clipvault_transfer::{ChunkPlan, MediaBlob};
use regex::Regex;

use crate::metadata::UploadMetadata;

/// Extensions stripped from the declared file name, applied in order.
const MEDIA_SUFFIXES: [&str; 4] = [".mp4", ".jpg", ".jpeg", ".JPG"];

const NANOS_PER_MILLI: i64 = 1_000_000;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("hashtag pattern is valid"));

/// Builds the creation payload for `blob`.
///
/// Pure: the chunk count comes from `plan` (built once for this blob) and
/// `now_nanos` is only read when the metadata carries no creation time.
/// A creation time of zero counts as absent.
pub fn build_record_init(
    user_id: &str,
    blob: &MediaBlob,
    plan: &ChunkPlan,
    caption: &str,
    external_id: &str,
    metadata: &UploadMetadata,
    now_nanos: i64,
) -> RecordInit {
    let caption = resolve_caption(caption, metadata);
    let tags = extract_tags(&caption);

    RecordInit {
        user_id: user_id.to_string(),
        external_id: external_id.to_string(),
        name: strip_media_suffix(blob.name()),
        caption,
        tags,
        chunk_count: plan.chunk_count(),
        created_at: metadata
            .created_at
            .filter(|ms| *ms != 0)
            .map(millis_to_nanos)
            .unwrap_or(now_nanos),
        last_modified_at: metadata.last_modified_at.map(millis_to_nanos).into_iter().collect(),
        geo_data: metadata.geo_data.clone().into_iter().collect(),
        geo_data_exif: metadata.geo_data_exif.clone().into_iter().collect(),
        people: metadata.people.clone().into_iter().collect(),
        uploaded_from: metadata.uploaded_from.clone().into_iter().collect(),
        album: metadata.album.clone().into_iter().collect(),
        view_count: metadata.view_count,
    }
}

/// The metadata caption wins over the explicit one unless it is empty.
pub fn resolve_caption(caption: &str, metadata: &UploadMetadata) -> String {
    match metadata.caption.as_deref() {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => caption.to_string(),
    }
}

/// Returns every `#word` token in `caption`, in order of appearance.
pub fn extract_tags(caption: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(caption)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Strips known media extensions from a declared file name.
pub fn strip_media_suffix(name: &str) -> String {
    MEDIA_SUFFIXES
        .iter()
        .fold(name, |n, suffix| n.strip_suffix(suffix).unwrap_or(n))
        .to_string()
}

pub fn millis_to_nanos(millis: i64) -> i64 {
    millis.saturating_mul(NANOS_PER_MILLI)
}

/// Current wall-clock time in nanoseconds since the Unix epoch.
pub fn current_time_nanos() -> i64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| millis_to_nanos(now.timestamp_millis()))
}
