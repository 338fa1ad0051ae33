//! Library manager: a user's videos and albums, plus sharing.

use clipvault_protocol::{Album, AlbumInfo, RecordId, RecordInfo};
use clipvault_uploader::MediaBackend;
use tracing::{debug, info, warn};

use crate::error::LibraryError;

/// Reads and organizes stored media through a [`MediaBackend`].
pub struct LibraryManager<'a> {
    backend: &'a dyn MediaBackend,
}

impl<'a> LibraryManager<'a> {
    pub fn new(backend: &'a dyn MediaBackend) -> Self {
        Self { backend }
    }

    /// Lists every completed video visible to `user_id`.
    pub async fn user_videos(&self, user_id: &str) -> Result<Vec<RecordInfo>, LibraryError> {
        require_user(user_id)?;
        let videos = self.backend.get_profile_videos(user_id).await?;
        debug!(user = user_id, count = videos.len(), "listed videos");
        Ok(videos)
    }

    /// Lists the albums owned by `user_id`.
    pub async fn user_albums(&self, user_id: &str) -> Result<Vec<Album>, LibraryError> {
        require_user(user_id)?;
        let albums = self.backend.get_profile_albums(user_id).await?;
        debug!(user = user_id, count = albums.len(), "listed albums");
        Ok(albums)
    }

    /// Files a video under an album.
    ///
    /// Failures are logged and reported as `None`.
    pub async fn add_video_to_album(
        &self,
        album: &str,
        video_id: &RecordId,
        user_id: &str,
    ) -> Option<Album> {
        match self.backend.add_video_to_album(album, video_id, user_id).await {
            Ok(Some(updated)) => {
                info!(album, video_id = %video_id, "video added to album");
                Some(updated)
            }
            Ok(None) => {
                warn!(album, video_id = %video_id, "album not found");
                None
            }
            Err(e) => {
                warn!(album, video_id = %video_id, error = %e, "failed to add video to album");
                None
            }
        }
    }

    /// Creates an album for `user_id`.
    ///
    /// Failures are logged and reported as `None`.
    pub async fn add_album(&self, name: &str, info: &AlbumInfo, user_id: &str) -> Option<Album> {
        match self.backend.create_album(name, info, user_id).await {
            Ok(album) => {
                if let Some(a) = &album {
                    info!(album_id = %a.album_id, name, "album created");
                }
                album
            }
            Err(e) => {
                warn!(name, error = %e, "failed to create album");
                None
            }
        }
    }

    /// Grants `target_user_id` read access to a video.
    ///
    /// Returns `None` when the video does not exist.
    pub async fn share_media(
        &self,
        video_id: &RecordId,
        target_user_id: &str,
    ) -> Result<Option<RecordInfo>, LibraryError> {
        require_user(target_user_id)?;
        let shared = self.backend.share_video(video_id, target_user_id).await?;
        if shared.is_some() {
            info!(video_id = %video_id, target = target_user_id, "video shared");
        }
        Ok(shared)
    }
}

fn require_user(user_id: &str) -> Result<(), LibraryError> {
    if user_id.is_empty() {
        return Err(LibraryError::NoUser);
    }
    Ok(())
}
