use crate::services::ingest::IngestError;
use crate::utils::validation::ValidationError;
use axum::{
    Json,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("{0} method not allowed")]
    MethodNotAllowed(Method),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Ingest(IngestError::Validation(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::MethodNotAllowed(_) => {
                let body = Json(json!({ "err": self.to_string() }));
                (StatusCode::METHOD_NOT_ALLOWED, body).into_response()
            }
            AppError::Ingest(IngestError::Validation(_)) | AppError::Multipart(_) => {
                tracing::warn!("Image upload rejected: {}", self);
                upload_failed(&self)
            }
            AppError::Ingest(IngestError::Staging(_)) => {
                tracing::error!("Image upload failed: {}", self);
                upload_failed(&self)
            }
        }
    }
}

fn upload_failed(err: &AppError) -> Response {
    let body = Json(json!({
        "message": "Image upload failed",
        "error": err.to_string(),
    }));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
