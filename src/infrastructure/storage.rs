use crate::config::IngestConfig;
use crate::services::cloudinary::CloudinaryStore;
use crate::services::remote::RemoteStore;
use crate::services::staging::LocalStager;
use crate::services::storage::S3Store;
use anyhow::{Context, Result, anyhow};
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

pub fn setup_staging(config: &IngestConfig) -> Result<Arc<LocalStager>> {
    let stager = LocalStager::new(&config.staging_dir)
        .with_context(|| format!("Failed to create staging directory {}", config.staging_dir))?;
    Ok(Arc::new(stager))
}

pub async fn setup_remote_store(config: &IngestConfig) -> Result<Arc<dyn RemoteStore>> {
    match config.remote_provider.as_str() {
        "cloudinary" => {
            let cloud_name = config
                .cloudinary_cloud_name
                .clone()
                .context("CLOUDINARY_CLOUD_NAME must be set")?;
            let api_key = config
                .cloudinary_api_key
                .clone()
                .context("CLOUDINARY_API_KEY must be set")?;
            let api_secret = config
                .cloudinary_api_secret
                .clone()
                .context("CLOUDINARY_API_SECRET must be set")?;

            info!("☁️  Cloudinary Storage: cloud {}", cloud_name);
            Ok(Arc::new(CloudinaryStore::new(cloud_name, api_key, api_secret)))
        }
        "s3" => Ok(Arc::new(setup_s3(config).await?)),
        other => Err(anyhow!("Unknown REMOTE_PROVIDER '{}'", other)),
    }
}

async fn setup_s3(config: &IngestConfig) -> Result<S3Store> {
    let endpoint_url = config
        .s3_endpoint
        .clone()
        .context("MINIO_ENDPOINT must be set")?;
    let access_key = config
        .s3_access_key
        .clone()
        .context("MINIO_ACCESS_KEY must be set")?;
    let secret_key = config
        .s3_secret_key
        .clone()
        .context("MINIO_SECRET_KEY must be set")?;
    let bucket = config.s3_bucket.clone().context("MINIO_BUCKET must be set")?;

    info!("☁️  S3 Storage: {} (Bucket: {})", endpoint_url, bucket);

    let aws_config = aws_config::from_env()
        .endpoint_url(&endpoint_url)
        .region(Region::new("us-east-1"))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            access_key, secret_key, None, None, "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    // Ensure bucket exists
    match s3_client.head_bucket().bucket(&bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", bucket),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", bucket);
            if let Err(e) = s3_client.create_bucket().bucket(&bucket).send().await {
                tracing::error!("❌ Failed to create bucket '{}': {}", bucket, e);
            } else {
                info!("✅ Bucket '{}' created successfully", bucket);
            }
        }
    }

    let public_base_url = config
        .s3_public_base_url
        .clone()
        .unwrap_or_else(|| format!("{}/{}", endpoint_url.trim_end_matches('/'), bucket));

    Ok(S3Store::new(s3_client, bucket, public_base_url))
}
