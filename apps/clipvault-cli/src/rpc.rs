//! HTTP backend: `Message` envelopes POSTed to the gateway's RPC endpoint.
//!
//! Async HTTP client using `reqwest` with optional Bearer token
//! authentication and a per-request timeout.

use clipvault_protocol::constants::RPC_PATH;
use clipvault_protocol::messages::{
    AddVideoToAlbumRequest, AlbumResponse, CreateAlbumRequest, CreateVideoRequest,
    CreateVideoResponse, GetVideoInfoRequest, ProfileAlbumsResponse, ProfileRequest,
    ProfileVideosResponse, PutVideoChunkRequest, PutVideoPicRequest, ShareVideoRequest,
    VideoInfoResponse,
};
use clipvault_protocol::{
    Album, AlbumInfo, ChunkPayload, Message, Method, RecordId, RecordInfo, RecordInit,
};
use clipvault_uploader::{BackendError, BackendFuture, MediaBackend, UploaderConfig};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Errors building the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum RpcSetupError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid access token")]
    InvalidToken,
}

/// Gateway client implementing [`MediaBackend`].
pub struct RpcBackend {
    http: reqwest::Client,
    url: String,
}

impl RpcBackend {
    pub fn new(config: &UploaderConfig) -> Result<Self, RpcSetupError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.access_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| RpcSetupError::InvalidToken)?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            url: rpc_url(&config.endpoint),
        })
    }

    /// Sends one request envelope and returns the response payload, if any.
    async fn call<Req, Resp>(&self, method: Method, req: &Req) -> Result<Option<Resp>, BackendError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let msg = Message::new(id.as_str(), method, Some(req))?;
        debug!(id = %id, method = %method, "rpc request");

        let resp = self
            .http
            .post(&self.url)
            .json(&msg)
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Transport(format!("HTTP {status}: {body}")));
        }

        let body = resp.bytes().await.map_err(transport)?;
        let reply: Message = serde_json::from_slice(&body)?;
        if let Some(err) = reply.error {
            return Err(BackendError::rejected(err.code, err.message));
        }
        Ok(reply.parse_payload()?)
    }

    /// Like [`call`](Self::call) for methods whose reply must carry a payload.
    async fn call_required<Req, Resp>(&self, method: Method, req: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        self.call(method, req)
            .await?
            .ok_or_else(|| BackendError::Transport(format!("empty {method} response")))
    }
}

fn transport(e: reqwest::Error) -> BackendError {
    BackendError::Transport(e.to_string())
}

/// Joins the gateway base URL and the RPC path.
fn rpc_url(endpoint: &str) -> String {
    format!("{}{RPC_PATH}", endpoint.trim_end_matches('/'))
}

impl MediaBackend for RpcBackend {
    fn create_record<'a>(&'a self, init: &'a RecordInit) -> BackendFuture<'a, RecordId> {
        Box::pin(async move {
            let req = CreateVideoRequest { init: init.clone() };
            let resp: CreateVideoResponse = self.call_required(Method::CreateVideo, &req).await?;
            Ok(resp.video_id)
        })
    }

    fn put_chunk<'a>(
        &'a self,
        record_id: &'a RecordId,
        index: u32,
        payload: ChunkPayload,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let req = PutVideoChunkRequest {
                video_id: record_id.clone(),
                chunk_num: index,
                chunk: payload,
            };
            self.call::<_, serde_json::Value>(Method::PutVideoChunk, &req)
                .await?;
            Ok(())
        })
    }

    fn put_thumbnail<'a>(
        &'a self,
        record_id: &'a RecordId,
        pic: Vec<u8>,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let req = PutVideoPicRequest {
                video_id: record_id.clone(),
                pic: ChunkPayload::new(pic),
            };
            self.call::<_, serde_json::Value>(Method::PutVideoPic, &req)
                .await?;
            Ok(())
        })
    }

    fn get_record<'a>(
        &'a self,
        user_id: &'a str,
        record_id: &'a RecordId,
    ) -> BackendFuture<'a, Option<RecordInfo>> {
        Box::pin(async move {
            let req = GetVideoInfoRequest {
                user_id: user_id.to_string(),
                video_id: record_id.clone(),
            };
            let resp: Option<VideoInfoResponse> = self.call(Method::GetVideoInfo, &req).await?;
            Ok(resp.and_then(|r| r.video))
        })
    }

    fn get_profile_videos<'a>(&'a self, user_id: &'a str) -> BackendFuture<'a, Vec<RecordInfo>> {
        Box::pin(async move {
            let req = ProfileRequest {
                user_id: user_id.to_string(),
            };
            let resp: Option<ProfileVideosResponse> =
                self.call(Method::GetProfileVideos, &req).await?;
            Ok(resp.map(|r| r.videos).unwrap_or_default())
        })
    }

    fn get_profile_albums<'a>(&'a self, user_id: &'a str) -> BackendFuture<'a, Vec<Album>> {
        Box::pin(async move {
            let req = ProfileRequest {
                user_id: user_id.to_string(),
            };
            let resp: Option<ProfileAlbumsResponse> =
                self.call(Method::GetProfileAlbums, &req).await?;
            Ok(resp.map(|r| r.albums).unwrap_or_default())
        })
    }

    fn create_album<'a>(
        &'a self,
        name: &'a str,
        info: &'a AlbumInfo,
        user_id: &'a str,
    ) -> BackendFuture<'a, Option<Album>> {
        Box::pin(async move {
            let req = CreateAlbumRequest {
                name: name.to_string(),
                info: info.clone(),
                user_id: user_id.to_string(),
            };
            let resp: Option<AlbumResponse> = self.call(Method::CreateAlbum, &req).await?;
            Ok(resp.and_then(|r| r.album))
        })
    }

    fn add_video_to_album<'a>(
        &'a self,
        album: &'a str,
        video_id: &'a RecordId,
        user_id: &'a str,
    ) -> BackendFuture<'a, Option<Album>> {
        Box::pin(async move {
            let req = AddVideoToAlbumRequest {
                album: album.to_string(),
                video_id: video_id.clone(),
                user_id: user_id.to_string(),
            };
            let resp: Option<AlbumResponse> = self.call(Method::AddVideoToAlbum, &req).await?;
            Ok(resp.and_then(|r| r.album))
        })
    }

    fn share_video<'a>(
        &'a self,
        video_id: &'a RecordId,
        target_user_id: &'a str,
    ) -> BackendFuture<'a, Option<RecordInfo>> {
        Box::pin(async move {
            let req = ShareVideoRequest {
                video_id: video_id.clone(),
                target_user_id: target_user_id.to_string(),
            };
            let resp: Option<VideoInfoResponse> = self.call(Method::ShareVideo, &req).await?;
            Ok(resp.and_then(|r| r.video))
        })
    }
}
