use super::remote::{RemoteError, RemoteStore};
use crate::models::StoredObject;
use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Signed image uploads to Cloudinary.
pub struct CloudinaryStore {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryStore {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name,
            api_key,
            api_secret,
        }
    }

    /// Points the store at a different API root (for self-hosted proxies and tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.api_base, self.cloud_name)
    }

    /// SHA-256 hex over `k=v` pairs sorted by key and joined with `&`, then the secret.
    pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
        let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl RemoteStore for CloudinaryStore {
    fn provider_id(&self) -> &'static str {
        "cloudinary"
    }

    async fn upload(&self, path: &Path, folder: &str) -> Result<StoredObject, RemoteError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = Self::sign(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.api_secret,
        );

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(data).file_name(file_name),
            )
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<UploadResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|p| p.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        match parsed {
            Some(UploadResponse {
                secure_url: Some(locator),
                public_id: Some(content_id),
                ..
            }) => Ok(StoredObject {
                locator,
                content_id,
            }),
            _ => Err(RemoteError::UnexpectedResponse(body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_sorts_params() {
        let a = CloudinaryStore::sign(&[("timestamp", "1"), ("folder", "f")], "secret");
        let b = CloudinaryStore::sign(&[("folder", "f"), ("timestamp", "1")], "secret");
        assert_eq!(a, b);

        let mut hasher = Sha256::new();
        hasher.update(b"folder=f&timestamp=1secret");
        assert_eq!(a, hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_sign_skips_empty_values() {
        let a = CloudinaryStore::sign(&[("folder", ""), ("timestamp", "1")], "s");
        let b = CloudinaryStore::sign(&[("timestamp", "1")], "s");
        assert_eq!(a, b);
    }

    #[test]
    fn test_upload_url() {
        let store = CloudinaryStore::new("demo".into(), "k".into(), "s".into())
            .with_api_base("http://127.0.0.1:9999/v1_1/");
        assert_eq!(store.upload_url(), "http://127.0.0.1:9999/v1_1/demo/image/upload");
    }
}
