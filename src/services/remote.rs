use crate::models::{StoredObject, UploadResult};
use crate::services::staging::StagedFile;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Why a remote upload did not produce a stored object.
///
/// Callers only ever see the sentinel result; the variants exist for logs.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote store rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from remote store: {0}")]
    UnexpectedResponse(String),

    #[error("Could not read staged file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote store misconfigured: {0}")]
    Misconfigured(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        RemoteError::Transport(e.to_string())
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Provider identifier for logs (e.g. "cloudinary", "s3")
    fn provider_id(&self) -> &'static str;

    /// Sends the file at `path` to the store under `folder`.
    async fn upload(&self, path: &Path, folder: &str) -> Result<StoredObject, RemoteError>;
}

/// Turns every remote problem into the sentinel result.
#[derive(Clone)]
pub struct RemoteUploader {
    store: Arc<dyn RemoteStore>,
}

impl RemoteUploader {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub fn provider_id(&self) -> &'static str {
        self.store.provider_id()
    }

    pub async fn upload(&self, staged: &StagedFile, folder: &str) -> UploadResult {
        match self.store.upload(staged.path(), folder).await {
            Ok(stored) => {
                tracing::info!(
                    "☁️  Uploaded {} to {} as {}",
                    staged.file_name(),
                    self.store.provider_id(),
                    stored.content_id
                );
                UploadResult::succeeded(stored)
            }
            Err(e) => {
                tracing::error!(
                    provider = self.store.provider_id(),
                    folder = folder,
                    file = staged.file_name(),
                    "Remote upload failed: {}",
                    e
                );
                UploadResult::failed()
            }
        }
    }
}
