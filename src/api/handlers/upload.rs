use crate::api::error::AppError;
use crate::config::IngestConfig;
use crate::models::{IncomingFile, UploadRequest, UploadResult};
use crate::utils::validation::{ValidationError, validate_file_type};
use axum::{
    Json,
    extract::{Multipart, State},
    http::Method,
};
use bytes::BytesMut;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadImagesResponse {
    pub message: String,
    pub data: Vec<UploadResult>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadErrorResponse {
    pub message: String,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MethodNotAllowedResponse {
    pub err: String,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = Multipart, description = "Up to four images under the `images` field"),
    responses(
        (status = 200, description = "Batch processed; entries without url/id failed remotely", body = UploadImagesResponse),
        (status = 500, description = "Batch rejected or staging failed", body = UploadErrorResponse),
        (status = 405, description = "Method not allowed", body = MethodNotAllowedResponse)
    ),
    tag = "upload"
)]
pub async fn upload_images(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImagesResponse>, AppError> {
    let result: Result<Json<UploadImagesResponse>, AppError> = async {
        let files = read_files(&mut multipart, &state.config).await?;
        tracing::info!("📥 Received {} image(s)", files.len());

        let data = state
            .coordinator
            .ingest(UploadRequest {
                files,
                folder: state.config.upload_folder.clone(),
            })
            .await?;

        Ok(Json(UploadImagesResponse {
            message: "Images uploaded successfully".to_string(),
            data,
        }))
    }
    .await;

    match result {
        Ok(res) => Ok(res),
        Err(e) => {
            // Drain what is left so the client sees our response instead of a reset.
            tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}

/// Any verb other than POST on the upload route.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method)
}

/// Buffers the image parts of a request.
///
/// Parts are checked as they arrive: a bad type is refused before its body is
/// read and an oversized part is cut off at the size limit. Text parts are
/// ignored.
async fn read_files(
    multipart: &mut Multipart,
    config: &IngestConfig,
) -> Result<Vec<IncomingFile>, AppError> {
    let mut files = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(e.to_string()))?
    {
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let field_name = field.name().unwrap_or_default().to_string();

        if field_name != config.field_name {
            return Err(ValidationError::UnexpectedField(field_name).into());
        }
        if files.len() >= config.max_files {
            return Err(ValidationError::TooManyFiles {
                count: files.len() + 1,
                max: config.max_files,
            }
            .into());
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        validate_file_type(&file_name, &content_type)?;

        let mut data = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Multipart(e.to_string()))?
        {
            if data.len() + chunk.len() > config.max_file_size {
                return Err(ValidationError::FileTooLarge {
                    file_name,
                    size: data.len() + chunk.len(),
                    max: config.max_file_size,
                }
                .into());
            }
            data.extend_from_slice(&chunk);
        }

        files.push(IncomingFile {
            field_name,
            file_name,
            content_type,
            data: data.freeze(),
        });
    }

    Ok(files)
}
