// Storage backend construction
//
// Builds the OpenDAL operator for the configured backend: local filesystem
// or any S3-compatible store (AWS S3, MinIO via endpoint override).

use anyhow::{Context, Result};
use nport2lake_config::{StorageBackend, StorageConfig};
use opendal::Operator;
use tracing::info;

pub fn init_operator(config: &StorageConfig) -> Result<Operator> {
    match config.backend {
        StorageBackend::Fs => {
            let fs = config
                .fs
                .as_ref()
                .context("fs config required for filesystem backend")?;
            info!(path = %fs.path, "using filesystem staging");

            let builder = opendal::services::Fs::default().root(&fs.path);
            Ok(Operator::new(builder)?.finish())
        }
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .context("s3 config required for s3 backend")?;
            info!(bucket = %s3.bucket, region = %s3.region, "using s3 staging");

            let mut builder = opendal::services::S3::default()
                .bucket(&s3.bucket)
                .region(&s3.region);

            if let Some(endpoint) = &s3.endpoint {
                builder = builder.endpoint(endpoint);
            }
            if !s3.access_key_id.is_empty() {
                builder = builder
                    .access_key_id(&s3.access_key_id)
                    .secret_access_key(&s3.secret_access_key);
            }

            Ok(Operator::new(builder)?.finish())
        }
    }
}
