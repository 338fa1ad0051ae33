//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clipvault_library::LibraryManager;
use clipvault_protocol::{RecordId, RecordInfo};
use clipvault_transfer::MediaBlob;
use clipvault_uploader::{
    MediaBackend, UploadEvent, UploadMetadata, UploadSession, Uploader, UploaderConfig,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Arguments of `clipvault upload`.
#[derive(Debug)]
pub struct UploadRequest {
    pub file: PathBuf,
    pub user: String,
    pub caption: String,
    pub external_id: String,
    pub metadata: Option<PathBuf>,
}

/// Picks the explicit user, falling back to the configured one.
pub fn resolve_user(user: Option<String>, config: &UploaderConfig) -> anyhow::Result<String> {
    match user {
        Some(u) if !u.is_empty() => Ok(u),
        _ if !config.user_id.is_empty() => Ok(config.user_id.clone()),
        _ => bail!("no user given; pass --user or set userId in the config file"),
    }
}

/// Reads capture metadata from `path`, if given.
///
/// Malformed fields are dropped. A missing `lastModifiedAt` is filled from
/// the file's modification time.
pub async fn load_metadata(path: Option<&Path>, blob: &MediaBlob) -> anyhow::Result<UploadMetadata> {
    let mut metadata = match path {
        Some(p) => {
            let raw = tokio::fs::read_to_string(p)
                .await
                .with_context(|| format!("reading metadata {}", p.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("parsing metadata {}", p.display()))?;
            UploadMetadata::from_json_lenient(&value)
        }
        None => UploadMetadata::default(),
    };
    if metadata.last_modified_at.is_none() {
        metadata.last_modified_at = blob.last_modified_ms();
    }
    Ok(metadata)
}

pub async fn upload(
    backend: Arc<dyn MediaBackend>,
    config: &UploaderConfig,
    req: UploadRequest,
) -> anyhow::Result<RecordInfo> {
    let blob = MediaBlob::from_path(&req.file)
        .await
        .with_context(|| format!("reading {}", req.file.display()))?;
    let metadata = load_metadata(req.metadata.as_deref(), &blob).await?;

    let (events_tx, events_rx) = mpsc::channel(256);
    let uploader = Uploader::from_config(backend, config)?.with_events(events_tx);
    let reporter = tokio::spawn(report_events(events_rx));

    let mut session = UploadSession::new(req.user, uploader);
    session.set_caption(req.caption);
    session.set_metadata(metadata);
    let result = session.trigger(blob, req.external_id).await;

    // Closing the last sender ends the reporter.
    drop(session);
    if let Err(e) = reporter.await {
        warn!(error = %e, "progress reporter stopped");
    }

    let info = result?;
    println!(
        "{}\t{}\t{} chunks\t{}",
        info.video_id,
        info.name,
        info.chunk_count,
        info.tags.join(" ")
    );
    Ok(info)
}

async fn report_events(mut rx: mpsc::Receiver<UploadEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            UploadEvent::RecordCreated {
                record_id,
                chunk_count,
            } => info!(record_id = %record_id, chunks = chunk_count, "record created"),
            UploadEvent::ChunkAcknowledged {
                acknowledged,
                total,
                progress,
                bytes_per_second,
                ..
            } => info!(
                "uploaded {acknowledged}/{total} chunks ({:.0}%, {})",
                progress * 100.0,
                format_rate(bytes_per_second)
            ),
            UploadEvent::ThumbnailSkipped { error, .. } => {
                warn!(error = %error, "thumbnail skipped")
            }
            UploadEvent::Verified { record_id } => info!(record_id = %record_id, "verified"),
            UploadEvent::ThumbnailStored { .. } | UploadEvent::Failed { .. } => {}
        }
    }
}

fn format_rate(bytes_per_second: f64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    if bytes_per_second >= MIB {
        format!("{:.1} MiB/s", bytes_per_second / MIB)
    } else if bytes_per_second >= KIB {
        format!("{:.1} KiB/s", bytes_per_second / KIB)
    } else {
        format!("{bytes_per_second:.0} B/s")
    }
}

/// Applies `clipvault config` flags to a config read from disk.
pub fn apply_settings(
    mut config: UploaderConfig,
    user: Option<String>,
    chunk_size: Option<u64>,
    token: Option<String>,
) -> anyhow::Result<UploaderConfig> {
    if let Some(user) = user {
        config.user_id = user;
    }
    if let Some(size) = chunk_size {
        config.chunk_size = size;
        config.chunk_size().context("invalid --chunk-size")?;
    }
    if let Some(token) = token {
        config.access_token = (!token.is_empty()).then_some(token);
    }
    Ok(config)
}

pub async fn list_videos(backend: &dyn MediaBackend, user: &str) -> anyhow::Result<()> {
    let videos = LibraryManager::new(backend).user_videos(user).await?;
    for v in &videos {
        println!("{}\t{}\t{}", v.video_id, v.name, v.caption);
    }
    info!(count = videos.len(), "videos listed");
    Ok(())
}

pub async fn list_albums(backend: &dyn MediaBackend, user: &str) -> anyhow::Result<()> {
    let albums = LibraryManager::new(backend).user_albums(user).await?;
    for a in &albums {
        println!("{}\t{}\t{} videos", a.album_id, a.info.name, a.videos.len());
    }
    info!(count = albums.len(), "albums listed");
    Ok(())
}

pub async fn share(backend: &dyn MediaBackend, video_id: &str, target: &str) -> anyhow::Result<()> {
    let video_id = RecordId::from(video_id);
    match LibraryManager::new(backend)
        .share_media(&video_id, target)
        .await?
    {
        Some(info) => println!("{}\tshared with {}", info.video_id, info.shared_with.join(", ")),
        None => bail!("video {video_id} not found"),
    }
    Ok(())
}
