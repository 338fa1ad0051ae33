use serde::{Deserialize, Serialize};

/// Path appended to the backend endpoint for envelope requests.
pub const RPC_PATH: &str = "/rpc";

/// Remote method identifier carried in every [`Message`](crate::Message).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    // Record writes
    #[serde(rename = "create_video")]
    CreateVideo,
    #[serde(rename = "put_video_chunk")]
    PutVideoChunk,
    #[serde(rename = "put_video_pic")]
    PutVideoPic,

    // Record reads
    #[serde(rename = "get_video_info")]
    GetVideoInfo,
    #[serde(rename = "get_profile_videos")]
    GetProfileVideos,

    // Albums and sharing
    #[serde(rename = "get_profile_albums")]
    GetProfileAlbums,
    #[serde(rename = "create_album")]
    CreateAlbum,
    #[serde(rename = "add_video_to_album")]
    AddVideoToAlbum,
    #[serde(rename = "share_video")]
    ShareVideo,

    /// Response-only marker used by error replies.
    #[serde(rename = "error")]
    Error,
}

impl Method {
    /// Returns the wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateVideo => "create_video",
            Self::PutVideoChunk => "put_video_chunk",
            Self::PutVideoPic => "put_video_pic",
            Self::GetVideoInfo => "get_video_info",
            Self::GetProfileVideos => "get_profile_videos",
            Self::GetProfileAlbums => "get_profile_albums",
            Self::CreateAlbum => "create_album",
            Self::AddVideoToAlbum => "add_video_to_album",
            Self::ShareVideo => "share_video",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
