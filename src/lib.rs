pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::IngestConfig;
use crate::services::ingest::BatchCoordinator;
use crate::services::remote::{RemoteStore, RemoteUploader};
use crate::services::staging::LocalStager;
use crate::utils::validation::ValidationRules;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::upload_images,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::upload::UploadImagesResponse,
            api::handlers::upload::UploadErrorResponse,
            api::handlers::upload::MethodNotAllowedResponse,
            api::handlers::health::HealthResponse,
            models::UploadResult,
        )
    ),
    tags(
        (name = "upload", description = "Batch image ingestion"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<BatchCoordinator>,
    pub staging_root: PathBuf,
    pub config: IngestConfig,
}

impl AppState {
    pub fn new(config: IngestConfig, stager: Arc<LocalStager>, remote: Arc<dyn RemoteStore>) -> Self {
        let staging_root = stager.root().to_path_buf();
        let coordinator = BatchCoordinator::new(
            stager,
            RemoteUploader::new(remote),
            ValidationRules::from(&config),
        );
        Self {
            coordinator: Arc::new(coordinator),
            staging_root,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api/upload",
            post(api::handlers::upload::upload_images)
                .fallback(api::handlers::upload::method_not_allowed)
                .layer(DefaultBodyLimit::max(state.config.body_limit())),
        )
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .with_state(state)
}
