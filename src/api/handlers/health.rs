use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use std::path::Path;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub staging: String,
    pub remote: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let staging = staging_status(&state.staging_root).await;

    Json(HealthResponse {
        status: "ok".to_string(),
        staging: staging.to_string(),
        remote: state.coordinator.provider_id().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Creates and removes a marker file to see whether staging would succeed.
async fn staging_status(root: &Path) -> &'static str {
    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return "missing",
    }

    let marker = root.join(format!(".health-{}", Uuid::new_v4().simple()));
    let created = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&marker)
        .await;
    match created {
        Ok(file) => {
            drop(file);
            if let Err(e) = tokio::fs::remove_file(&marker).await {
                tracing::error!("Failed to remove health marker {}: {}", marker.display(), e);
            }
            "writable"
        }
        Err(e) => {
            tracing::warn!("Staging directory {} not writable: {}", root.display(), e);
            "readonly"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writable_root_leaves_no_marker() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(staging_status(dir.path()).await, "writable");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_or_non_directory_root() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(staging_status(&dir.path().join("gone")).await, "missing");

        let plain = dir.path().join("plain");
        std::fs::write(&plain, b"x").unwrap();
        assert_eq!(staging_status(&plain).await, "missing");
    }
}
