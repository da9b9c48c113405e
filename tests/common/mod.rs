#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use media_ingest::models::{IncomingFile, StoredObject};
use media_ingest::services::remote::{RemoteError, RemoteStore};
use media_ingest::services::staging::{LocalStager, StagedFile, Stager, StagingError};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub path: PathBuf,
    pub folder: String,
    pub data: Vec<u8>,
}

/// In-memory remote store that can be told to fail or panic on given calls.
#[derive(Default)]
pub struct MockRemoteStore {
    uploads: Mutex<Vec<RecordedUpload>>,
    calls: AtomicUsize,
    fail_on: Vec<usize>,
    panic_on: Vec<usize>,
    delays: Vec<(usize, Duration)>,
    pub started: Notify,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls are numbered from 1.
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_on: calls.to_vec(),
            ..Self::default()
        }
    }

    pub fn panicking_on(calls: &[usize]) -> Self {
        Self {
            panic_on: calls.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, call: usize, delay: Duration) -> Self {
        self.delays.push((call, delay));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    fn provider_id(&self) -> &'static str {
        "mock"
    }

    async fn upload(&self, path: &Path, folder: &str) -> Result<StoredObject, RemoteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let data = tokio::fs::read(path).await?;
        self.uploads.lock().unwrap().push(RecordedUpload {
            path: path.to_path_buf(),
            folder: folder.to_string(),
            data,
        });
        self.started.notify_one();

        if let Some((_, delay)) = self.delays.iter().find(|(c, _)| *c == call) {
            tokio::time::sleep(*delay).await;
        }
        if self.panic_on.contains(&call) {
            panic!("mock remote store exploded on call {}", call);
        }
        if self.fail_on.contains(&call) {
            return Err(RemoteError::Rejected {
                status: 503,
                message: format!("mock rejection on call {}", call),
            });
        }

        Ok(StoredObject {
            locator: format!("https://cdn.test/{}/u{}", folder, call),
            content_id: format!("{}/c{}", folder, call),
        })
    }
}

/// Local stager whose n-th write (from 1) fails like a full disk.
pub struct FailingStager {
    inner: LocalStager,
    fail_on: usize,
    calls: AtomicUsize,
}

impl FailingStager {
    pub fn new(inner: LocalStager, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Stager for FailingStager {
    async fn stage(&self, file: &IncomingFile) -> Result<StagedFile, StagingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(StagingError {
                file_name: file.file_name.clone(),
                path: self.inner.root().join(&file.file_name),
                source: std::io::Error::other("No space left on device"),
            });
        }
        self.inner.stage(file).await
    }
}

pub fn image(name: &str, content_type: &str, data: impl Into<Bytes>) -> IncomingFile {
    IncomingFile {
        field_name: "images".to_string(),
        file_name: name.to_string(),
        content_type: content_type.to_string(),
        data: data.into(),
    }
}

pub fn jpeg(name: &str, data: &'static [u8]) -> IncomingFile {
    image(name, "image/jpeg", Bytes::from_static(data))
}

pub fn staged_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

pub struct Part<'a> {
    pub field: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: &'a str,
    pub data: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn file(field: &'a str, file_name: &'a str, content_type: &'a str, data: Vec<u8>) -> Self {
        Self {
            field,
            file_name: Some(file_name),
            content_type,
            data,
        }
    }

    pub fn text(field: &'a str, value: &str) -> Self {
        Self {
            field,
            file_name: None,
            content_type: "text/plain",
            data: value.as_bytes().to_vec(),
        }
    }
}

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    part.field, file_name, part.content_type
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.field)
                    .as_bytes(),
            ),
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
