// Configuration validation
//
// Required fields must be present and values sensible for the selected
// backend. A missing API key is a warning, not an error: offline commands
// still work without one.

use crate::{RuntimeConfig, StorageBackend, StorageConfig};
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    if config.source.base_url.trim().is_empty() {
        bail!("source.base_url must not be empty");
    }

    if config.source.api_key.is_none() {
        warn!("source.api_key is not set; downloads will fail until NPORT2LAKE_API_KEY or source.api_key is configured");
    }

    validate_storage_config(&config.storage)?;

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<()> {
    if config.dataset.trim().is_empty() {
        bail!("storage.dataset must not be empty");
    }
    if config.dataset.contains('/') {
        bail!("storage.dataset must not contain '/' (it is a single path segment)");
    }

    match config.backend {
        StorageBackend::Fs => {
            let fs = match &config.fs {
                Some(fs) => fs,
                None => bail!("storage.fs config required for filesystem backend"),
            };
            if fs.path.trim().is_empty() {
                bail!("storage.fs.path must not be empty");
            }
        }
        StorageBackend::S3 => {
            let s3 = match &config.s3 {
                Some(s3) => s3,
                None => bail!("storage.s3 config required for s3 backend"),
            };
            if s3.bucket.trim().is_empty() {
                bail!("storage.s3.bucket must not be empty");
            }
            if s3.access_key_id.is_empty() || s3.secret_access_key.is_empty() {
                warn!(
                    bucket = %s3.bucket,
                    "s3 credentials not set; relying on ambient credentials"
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::S3Config;

    #[test]
    fn test_defaults_validate() {
        RuntimeConfig::default().validate().unwrap();
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let mut config = RuntimeConfig::default();
        config.storage.dataset = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dataset_with_slash_rejected() {
        let mut config = RuntimeConfig::default();
        config.storage.dataset = "bronze/nport".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_backend_requires_bucket() {
        let mut config = RuntimeConfig::default();
        config.storage.backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.storage.s3 = Some(S3Config {
            bucket: "nport-raw".to_string(),
            ..S3Config::default()
        });
        config.validate().unwrap();
    }

    #[test]
    fn test_fs_backend_requires_path() {
        let mut config = RuntimeConfig::default();
        config.storage.fs = None;
        assert!(config.validate().is_err());
    }
}
