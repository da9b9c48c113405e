use crate::models::IncomingFile;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("Failed to stage '{file_name}' at {}: {source}", .path.display())]
pub struct StagingError {
    pub file_name: String,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A local copy of one uploaded file.
///
/// The copy is deleted exactly once: explicitly through [`StagedFile::remove`],
/// or on drop if the owner never got that far.
#[derive(Debug)]
pub struct StagedFile {
    path: Option<PathBuf>,
    field_name: String,
    file_name: String,
    extension: String,
    content_type: String,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Name the client declared for the file.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Deletes the local copy.
    pub async fn remove(mut self) {
        if let Some(path) = self.path.take() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Removed staged file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("Staged file {} already gone", path.display())
                }
                Err(e) => tracing::error!(
                    "Failed to remove staged file {}, it is left behind: {}",
                    path.display(),
                    e
                ),
            }
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            tracing::warn!(
                "Staged file {} released without explicit cleanup, removing",
                path.display()
            );
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::error!(
                    "Failed to remove staged file {}, it is left behind: {}",
                    path.display(),
                    e
                ),
            }
        }
    }
}

#[async_trait]
pub trait Stager: Send + Sync {
    async fn stage(&self, file: &IncomingFile) -> Result<StagedFile, StagingError>;
}

/// Stages files under a local directory.
#[derive(Debug, Clone)]
pub struct LocalStager {
    root: PathBuf,
}

impl LocalStager {
    /// Creates the staging directory if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::info!("📁 Staging directory: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<field>-<unix nanos>-<random>.<ext>`
    fn unique_name(field_name: &str, extension: &str) -> String {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        let suffix = Uuid::new_v4().simple().to_string();
        let field: String = field_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if extension.is_empty() {
            format!("{}-{}-{}", field, nanos, &suffix[..8])
        } else {
            format!("{}-{}-{}.{}", field, nanos, &suffix[..8], extension)
        }
    }

    async fn open_new(path: &Path) -> std::io::Result<tokio::fs::File> {
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
    }

    async fn write_all(mut handle: tokio::fs::File, data: &[u8]) -> std::io::Result<()> {
        handle.write_all(data).await?;
        handle.flush().await
    }

    /// Creates the file and writes `file` into it.
    ///
    /// The guard is built as soon as the file exists, so every later exit
    /// path deletes it.
    async fn stage_owned(root: PathBuf, file: IncomingFile) -> Result<StagedFile, StagingError> {
        let extension = file.extension().unwrap_or_default();
        let path = root.join(Self::unique_name(&file.field_name, &extension));

        let opened = match Self::open_new(&path).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Root removed from under us; recreate and try once more.
                tracing::warn!("Staging directory {} missing, recreating", root.display());
                match tokio::fs::create_dir_all(&root).await {
                    Ok(()) => Self::open_new(&path).await,
                    Err(e) => Err(e),
                }
            }
            other => other,
        };
        let handle = opened.map_err(|source| staging_error(&file, &path, source))?;

        let staged = StagedFile {
            path: Some(path),
            field_name: file.field_name.clone(),
            file_name: file.file_name.clone(),
            extension,
            content_type: file.content_type.clone(),
        };

        if let Err(source) = Self::write_all(handle, &file.data).await {
            let err = staging_error(&file, staged.path(), source);
            staged.remove().await;
            return Err(err);
        }

        tracing::debug!(
            "Staged {} ({} bytes) at {}",
            file.file_name,
            file.size(),
            staged.path().display()
        );
        Ok(staged)
    }
}

fn staging_error(file: &IncomingFile, path: &Path, source: std::io::Error) -> StagingError {
    StagingError {
        file_name: file.file_name.clone(),
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl Stager for LocalStager {
    async fn stage(&self, file: &IncomingFile) -> Result<StagedFile, StagingError> {
        // Runs detached: a cancelled caller leaves the task to finish and
        // drop its own guard.
        let task = tokio::spawn(Self::stage_owned(self.root.clone(), file.clone()));
        match task.await {
            Ok(staged) => staged,
            Err(e) => Err(StagingError {
                file_name: file.file_name.clone(),
                path: self.root.clone(),
                source: std::io::Error::other(e.to_string()),
            }),
        }
    }
}
