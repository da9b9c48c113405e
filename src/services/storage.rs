use super::remote::{RemoteError, RemoteStore};
use crate::models::StoredObject;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use uuid::Uuid;

/// Stores images in an S3-compatible bucket.
pub struct S3Store {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `<folder>/<uuid>.<ext>`
    pub fn object_key(folder: &str, extension: Option<&str>) -> String {
        let folder = folder.trim_matches('/');
        let id = Uuid::new_v4();
        match (folder.is_empty(), extension) {
            (true, Some(ext)) => format!("{}.{}", id, ext),
            (true, None) => id.to_string(),
            (false, Some(ext)) => format!("{}/{}.{}", folder, id, ext),
            (false, None) => format!("{}/{}", folder, id),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

fn content_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl RemoteStore for S3Store {
    fn provider_id(&self) -> &'static str {
        "s3"
    }

    async fn upload(&self, path: &Path, folder: &str) -> Result<StoredObject, RemoteError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let key = Self::object_key(folder, extension.as_deref());

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| RemoteError::Io(std::io::Error::other(e)))?;

        let res = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type_for(extension.as_deref()))
            .body(body)
            .send()
            .await;

        if let Err(e) = res {
            let service_error = e.into_service_error();
            return Err(RemoteError::Transport(format!(
                "S3 put_object failed: bucket={}, key={}, error={:?}",
                self.bucket, key, service_error
            )));
        }

        Ok(StoredObject {
            locator: self.public_url(&key),
            content_id: key,
        })
    }
}
