fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use clipvault_protocol::messages::{
        CreateVideoRequest, GetVideoInfoRequest, ProfileAlbumsResponse, PutVideoChunkRequest,
        VideoInfoResponse,
    };
    use clipvault_protocol::{Message, Method};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Reads a fixture file as text.
    fn load_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Normalizes JSON values so that integer-valued floats compare equal.
    ///
    /// Gateways may emit `12` where Rust writes `12.0` for an `f64`.
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => serde_json::json!(f),
                None => v.clone(),
            },
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect(),
            ),
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture into `T`, re-serializes it, and compares the
    /// JSON values (order-independent, float-normalized comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let raw = load_fixture(name);
        let fixture: serde_json::Value = serde_json::from_str(&raw)
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"));
        let parsed: T = serde_json::from_str(&raw)
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&reserialized),
            "roundtrip mismatch for {name}:\n  wire: {fixture}\n  Rust: {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_create_video_request() {
        let req = roundtrip_test::<CreateVideoRequest>("create_video_request.json");
        assert_eq!(req.init.chunk_count, 20);
        assert_eq!(req.init.tags, vec!["#beach", "#vacation"]);
        assert_eq!(req.init.geo_data[0].altitude, None);
    }

    #[test]
    fn fixture_put_video_chunk_request() {
        let req = roundtrip_test::<PutVideoChunkRequest>("put_video_chunk_request.json");
        assert_eq!(req.chunk_num, 2);
        assert_eq!(req.chunk.as_bytes(), &[0, 1, 2, 253, 254, 255]);
    }

    #[test]
    fn fixture_video_info_response() {
        let resp = roundtrip_test::<VideoInfoResponse>("video_info_response.json");
        let video = resp.video.unwrap();
        assert_eq!(video.video_id.as_str(), "alice-1");
        assert_eq!(video.shared_with, vec!["bob"]);
        assert_eq!(video.geo_data[0].altitude, Some(12.0));
    }

    #[test]
    fn fixture_video_info_absent() {
        let resp = roundtrip_test::<VideoInfoResponse>("video_info_absent.json");
        assert!(resp.video.is_none());
    }

    #[test]
    fn fixture_profile_albums_response() {
        let resp = roundtrip_test::<ProfileAlbumsResponse>("profile_albums_response.json");
        let album = &resp.albums[0];
        assert_eq!(album.info.name, "Summer");
        assert!(album.info.is_private);
        assert_eq!(album.videos.len(), 1);
    }

    #[test]
    fn fixture_message_envelope() {
        let msg = roundtrip_test::<Message>("message_envelope.json");
        assert_eq!(msg.method, Method::GetVideoInfo);
        assert!(msg.error.is_none());
        let req: GetVideoInfoRequest = msg.parse_payload().unwrap().unwrap();
        assert_eq!(req.user_id, "alice");
        assert_eq!(req.video_id.as_str(), "alice-1");
    }

    #[test]
    fn fixture_message_error() {
        let msg = roundtrip_test::<Message>("message_error.json");
        assert_eq!(msg.method, Method::Error);
        let err = msg.error.unwrap();
        assert_eq!(err.code, 409);
        assert!(msg.payload.is_none());
    }

    #[test]
    fn all_fixtures_are_covered() {
        let mut names: Vec<String> = fs::read_dir(fixtures_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "create_video_request.json",
                "message_envelope.json",
                "message_error.json",
                "profile_albums_response.json",
                "put_video_chunk_request.json",
                "video_info_absent.json",
                "video_info_response.json",
            ]
        );
    }
}
