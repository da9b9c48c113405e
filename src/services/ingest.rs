use crate::models::{BatchResult, UploadRequest, UploadResult};
use crate::services::remote::RemoteUploader;
use crate::services::staging::{StagingError, Stager};
use crate::utils::validation::{ValidationError, ValidationRules, validate_batch};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Staging(#[from] StagingError),
}

/// Runs a batch through staging, remote upload and cleanup, one file at a time.
pub struct BatchCoordinator {
    stager: Arc<dyn Stager>,
    uploader: RemoteUploader,
    rules: ValidationRules,
}

impl BatchCoordinator {
    pub fn new(stager: Arc<dyn Stager>, uploader: RemoteUploader, rules: ValidationRules) -> Self {
        Self {
            stager,
            uploader,
            rules,
        }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn provider_id(&self) -> &'static str {
        self.uploader.provider_id()
    }

    /// Ingests every file of `request` in order.
    ///
    /// The returned result has one entry per input file, in input order. A
    /// remote failure becomes the sentinel entry for that file and the batch
    /// carries on. A staging failure stops the batch; files uploaded before
    /// it stay on the remote store.
    pub async fn ingest(&self, request: UploadRequest) -> Result<BatchResult, IngestError> {
        validate_batch(&request.files, &self.rules)?;

        let total = request.files.len();
        let mut results = Vec::with_capacity(total);

        for (index, file) in request.files.iter().enumerate() {
            let staged = self.stager.stage(file).await.map_err(|e| {
                tracing::error!(
                    "Staging failed for file {}/{} ({}), aborting batch after {} uploads: {}",
                    index + 1,
                    total,
                    file.file_name,
                    results.len(),
                    e
                );
                e
            })?;
            tracing::debug!(file = %file.file_name, "staged -> uploading");

            let result = AssertUnwindSafe(self.uploader.upload(&staged, &request.folder))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    tracing::error!(
                        file = %file.file_name,
                        "Remote upload panicked, recording as failed"
                    );
                    UploadResult::failed()
                });

            let outcome = if result.is_success() {
                "succeeded"
            } else {
                "failed_remote"
            };
            tracing::debug!(file = %file.file_name, outcome, "uploading -> done");

            staged.remove().await;
            tracing::debug!(file = %file.file_name, "cleaned");

            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(
            "📦 Batch complete: {}/{} uploaded to {} ({})",
            succeeded,
            total,
            self.uploader.provider_id(),
            request.folder
        );

        Ok(results)
    }
}
