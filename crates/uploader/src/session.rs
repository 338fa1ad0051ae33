//! Upload session: single-owner front controller for one user's uploads.
//!
//! The session holds the upload intent (blob, caption, metadata, external
//! id, ready flag) and runs exactly one upload per trigger. The intent is
//! only touched again after the upload settles.

use clipvault_protocol::RecordInfo;
use clipvault_transfer::MediaBlob;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::UploadError;
use crate::metadata::UploadMetadata;
use crate::orchestrator::Uploader;
use crate::types::SessionState;

#[derive(Debug, Default)]
struct UploadIntent {
    blob: Option<MediaBlob>,
    caption: String,
    metadata: UploadMetadata,
    external_id: String,
    ready: bool,
}

/// Stateful upload controller.
pub struct UploadSession {
    user_id: String,
    uploader: Uploader,
    intent: UploadIntent,
    completed: Option<RecordInfo>,
    state_tx: watch::Sender<SessionState>,
}

impl UploadSession {
    pub fn new(user_id: impl Into<String>, uploader: Uploader) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            user_id: user_id.into(),
            uploader,
            intent: UploadIntent::default(),
            completed: None,
            state_tx,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Watches state transitions, including `Uploading` while a trigger runs.
    ///
    /// The receiver sees the latest state only; the transient `Triggered`
    /// is never delivered.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Result of the last successful upload.
    ///
    /// A failed upload leaves the previous result in place.
    pub fn completed(&self) -> Option<&RecordInfo> {
        self.completed.as_ref()
    }

    pub fn caption(&self) -> &str {
        &self.intent.caption
    }

    pub fn external_id(&self) -> &str {
        &self.intent.external_id
    }

    pub fn metadata(&self) -> &UploadMetadata {
        &self.intent.metadata
    }

    pub fn blob(&self) -> Option<&MediaBlob> {
        self.intent.blob.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.intent.ready
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.intent.caption = caption.into();
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) {
        self.intent.external_id = external_id.into();
    }

    pub fn set_metadata(&mut self, metadata: UploadMetadata) {
        self.intent.metadata = metadata;
    }

    /// Selects (or clears) the blob to upload.
    pub fn set_blob(&mut self, blob: Option<MediaBlob>) {
        self.intent.blob = blob;
        self.set_state(if self.intent.blob.is_some() {
            SessionState::Armed
        } else {
            SessionState::Idle
        });
    }

    /// Raises or lowers the ready flag.
    ///
    /// Raising it while a blob is armed runs one upload and returns `true`.
    /// Raising it without a blob does nothing; the flag stays up and no
    /// upload starts until it is lowered and raised again.
    pub async fn set_ready(&mut self, ready: bool) -> bool {
        let was_ready = self.intent.ready;
        self.intent.ready = ready;
        if !ready || was_ready {
            return false;
        }

        let Some(blob) = self.intent.blob.clone() else {
            debug!(user = %self.user_id, "ready raised without a blob, ignoring");
            return false;
        };

        let external_id = self.intent.external_id.clone();
        self.handle_upload(blob, external_id).await;
        true
    }

    /// Uploads `blob` using the session's caption and metadata, logging any
    /// failure instead of returning it.
    pub async fn handle_upload(
        &mut self,
        blob: MediaBlob,
        external_id: impl Into<String>,
    ) -> Option<&RecordInfo> {
        info!(user = %self.user_id, name = %blob.name(), "storing video");
        match self.trigger(blob, external_id).await {
            Ok(_) => self.completed.as_ref(),
            Err(e) => {
                error!(user = %self.user_id, error = %e, "failed to store video");
                None
            }
        }
    }

    /// Runs one upload and returns its outcome.
    ///
    /// Whatever the outcome, the blob, external id and metadata are cleared
    /// and the ready flag is lowered afterwards; the caption is kept.
    pub async fn trigger(
        &mut self,
        blob: MediaBlob,
        external_id: impl Into<String>,
    ) -> Result<RecordInfo, UploadError> {
        let external_id = external_id.into();
        self.set_state(SessionState::Triggered);
        self.set_state(SessionState::Uploading);

        let result = self
            .uploader
            .upload(
                &self.user_id,
                &blob,
                &self.intent.caption,
                &external_id,
                &self.intent.metadata,
            )
            .await;

        if let Ok(info) = &result {
            self.completed = Some(info.clone());
        }
        self.reset_intent();
        result
    }

    fn reset_intent(&mut self) {
        self.intent.blob = None;
        self.intent.external_id.clear();
        self.intent.metadata = UploadMetadata::default();
        self.intent.ready = false;
        self.set_state(SessionState::Idle);
    }

    fn set_state(&self, state: SessionState) {
        self.state_tx.send_replace(state);
    }
}
