use bytes::Bytes;
use serde::Serialize;
use utoipa::ToSchema;

/// One file part received in an upload request.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lowercased extension of the declared file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// A batch of files sharing one destination folder.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub files: Vec<IncomingFile>,
    pub folder: String,
}

/// What the remote store hands back for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub locator: String,
    pub content_id: String,
}

/// Per-file outcome of a batch.
///
/// Either both `url` and `id` are present or neither is. Absent fields are
/// left out of the JSON entirely, so a failed upload serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadResult {
    /// Public retrieval URL
    #[serde(rename = "url", skip_serializing_if = "Option::is_none")]
    locator: Option<String>,
    /// Remote content identifier
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    content_id: Option<String>,
}

impl UploadResult {
    pub fn succeeded(stored: StoredObject) -> Self {
        Self {
            locator: Some(stored.locator),
            content_id: Some(stored.content_id),
        }
    }

    /// The sentinel pair recorded when the remote store did not accept a file.
    pub fn failed() -> Self {
        Self {
            locator: None,
            content_id: None,
        }
    }

    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.locator.is_some()
    }
}

pub type BatchResult = Vec<UploadResult>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_serializes_empty() {
        let json = serde_json::to_value(UploadResult::failed()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_succeeded_result_uses_wire_names() {
        let result = UploadResult::succeeded(StoredObject {
            locator: "https://cdn.example/a.jpg".to_string(),
            content_id: "products/a".to_string(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["url"], "https://cdn.example/a.jpg");
        assert_eq!(json["id"], "products/a");
        assert!(result.is_success());
    }

    #[test]
    fn test_extension_is_lowercased() {
        let file = IncomingFile {
            field_name: "images".to_string(),
            file_name: "Photo.JPEG".to_string(),
            content_type: "image/jpeg".to_string(),
            data: Bytes::new(),
        };
        assert_eq!(file.extension().as_deref(), Some("jpeg"));
    }
}
