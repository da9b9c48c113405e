use std::env;

/// Batch ingestion configuration
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Maximum size of a single image in bytes (default: 3 MB)
    pub max_file_size: usize,

    /// Maximum number of images in one request (default: 4)
    pub max_files: usize,

    /// Multipart field carrying the images (default: "images")
    pub field_name: String,

    /// Local directory for staged files (default: "uploads")
    pub staging_dir: String,

    /// Logical folder on the remote store (default: "fashionshop/products")
    pub upload_folder: String,

    /// Remote store type: "cloudinary" or "s3" (default: "cloudinary")
    pub remote_provider: String,

    /// Cloudinary cloud name
    pub cloudinary_cloud_name: Option<String>,
    /// Cloudinary API key
    pub cloudinary_api_key: Option<String>,
    /// Cloudinary API secret
    pub cloudinary_api_secret: Option<String>,

    /// S3-compatible endpoint
    pub s3_endpoint: Option<String>,
    /// S3 access key
    pub s3_access_key: Option<String>,
    /// S3 secret key
    pub s3_secret_key: Option<String>,
    /// S3 bucket
    pub s3_bucket: Option<String>,
    /// Base URL objects are publicly served from (defaults to endpoint/bucket)
    pub s3_public_base_url: Option<String>,

    /// Listen address (default: "127.0.0.1:3000")
    pub bind_addr: String,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: 3 * 1024 * 1024, // 3 MB
            max_files: 4,
            field_name: "images".to_string(),
            staging_dir: "uploads".to_string(),
            upload_folder: "fashionshop/products".to_string(),
            remote_provider: "cloudinary".to_string(),
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            s3_endpoint: None,
            s3_access_key: None,
            s3_secret_key: None,
            s3_bucket: None,
            s3_public_base_url: None,
            bind_addr: "127.0.0.1:3000".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl IngestConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            max_files: env::var("MAX_FILES_PER_BATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_files),

            field_name: env::var("UPLOAD_FIELD_NAME").unwrap_or(default.field_name),

            staging_dir: env::var("STAGING_DIR").unwrap_or(default.staging_dir),

            upload_folder: env::var("UPLOAD_FOLDER").unwrap_or(default.upload_folder),

            remote_provider: env::var("REMOTE_PROVIDER")
                .map(|v| v.to_lowercase())
                .unwrap_or(default.remote_provider),

            cloudinary_cloud_name: env::var("CLOUDINARY_CLOUD_NAME").ok(),
            cloudinary_api_key: env::var("CLOUDINARY_API_KEY").ok(),
            cloudinary_api_secret: env::var("CLOUDINARY_API_SECRET").ok(),

            s3_endpoint: env::var("MINIO_ENDPOINT").ok(),
            s3_access_key: env::var("MINIO_ACCESS_KEY").ok(),
            s3_secret_key: env::var("MINIO_SECRET_KEY").ok(),
            s3_bucket: env::var("MINIO_BUCKET").ok(),
            s3_public_base_url: env::var("S3_PUBLIC_BASE_URL").ok(),

            bind_addr: env::var("BIND_ADDR").unwrap_or(default.bind_addr),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (local staging under the system temp dir)
    pub fn development() -> Self {
        Self {
            staging_dir: env::temp_dir()
                .join("media-ingest-staging")
                .to_string_lossy()
                .into_owned(),
            ..Self::default()
        }
    }

    /// Create config for production (credentials of the selected provider are mandatory)
    pub fn production() -> Self {
        let config = Self::from_env();
        match config.remote_provider.as_str() {
            "cloudinary" => {
                assert!(
                    config.cloudinary_cloud_name.is_some()
                        && config.cloudinary_api_key.is_some()
                        && config.cloudinary_api_secret.is_some(),
                    "CRITICAL: CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set"
                );
            }
            "s3" => {
                assert!(
                    config.s3_endpoint.is_some()
                        && config.s3_access_key.is_some()
                        && config.s3_secret_key.is_some()
                        && config.s3_bucket.is_some(),
                    "CRITICAL: MINIO_ENDPOINT, MINIO_ACCESS_KEY, MINIO_SECRET_KEY and MINIO_BUCKET must be set"
                );
            }
            other => panic!("CRITICAL: unknown REMOTE_PROVIDER '{}'", other),
        }
        config
    }

    /// Upper bound for a whole multipart body, including part headers.
    pub fn body_limit(&self) -> usize {
        self.max_files * self.max_file_size + 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IngestConfig::default();
        assert_eq!(config.max_file_size, 3 * 1024 * 1024);
        assert_eq!(config.max_files, 4);
        assert_eq!(config.field_name, "images");
        assert_eq!(config.upload_folder, "fashionshop/products");
        assert_eq!(config.remote_provider, "cloudinary");
    }

    #[test]
    fn test_body_limit_covers_full_batch() {
        let config = IngestConfig::default();
        assert!(config.body_limit() > config.max_files * config.max_file_size);
    }

    #[test]
    fn test_development_config_stages_under_temp() {
        let config = IngestConfig::development();
        assert!(config.staging_dir.contains("media-ingest-staging"));
        assert_eq!(config.max_file_size, IngestConfig::default().max_file_size);
    }

    #[test]
    fn test_from_env_cors_fallback() {
        unsafe { env::remove_var("ALLOWED_ORIGINS") };
        let config = IngestConfig::from_env();
        let default_config = IngestConfig::default();
        assert_eq!(config.allowed_origins, default_config.allowed_origins);
        assert!(!config.allowed_origins.contains(&"*".to_string()));
    }
}
