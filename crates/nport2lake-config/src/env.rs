// Environment-variable overrides (highest priority).

use crate::{FsConfig, RuntimeConfig, S3Config, StorageBackend};
use anyhow::{Context, Result};

pub const ENV_PREFIX: &str = "NPORT2LAKE_";

/// Abstraction over environment lookups so tests can supply overrides
/// without mutating process state.
pub trait EnvSource {
    /// Get a variable with the NPORT2LAKE_ prefix applied.
    fn get(&self, key: &str) -> Option<String>;

    /// Get a variable WITHOUT the prefix. Used for the standard AWS
    /// credential pair so existing shells keep working.
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// `std::env`-backed source used outside tests.
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{ENV_PREFIX}{key}")).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Apply environment-variable overrides to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Source
    if let Some(key) = env.get("API_KEY") {
        config.source.api_key = Some(key);
    }
    if let Some(url) = env.get("BASE_URL") {
        config.source.base_url = url;
    }
    if let Some(agent) = env.get("USER_AGENT") {
        config.source.user_agent = agent;
    }

    // Logging
    if let Some(level) = env.get("LOG_LEVEL") {
        config.log_level = level;
    }

    // Storage
    if let Some(dataset) = env.get("DATASET") {
        config.storage.dataset = dataset;
    }
    if let Some(backend) = env.get("STORAGE_BACKEND") {
        config.storage.backend = backend
            .parse::<StorageBackend>()
            .context("Invalid NPORT2LAKE_STORAGE_BACKEND value")?;
    }
    if let Some(path) = env.get("STORAGE_PATH") {
        config.storage.fs.get_or_insert_with(FsConfig::default).path = path;
    }

    // S3 storage
    if let Some(bucket) = env.get("S3_BUCKET") {
        ensure_s3(config).bucket = bucket;
    }
    if let Some(region) = env.get("S3_REGION") {
        ensure_s3(config).region = region;
    }
    if let Some(endpoint) = env.get("S3_ENDPOINT") {
        ensure_s3(config).endpoint = Some(endpoint);
    }
    // AWS standard credentials (no prefix, for compatibility)
    if let Some(access_key_id) = env.get_raw("AWS_ACCESS_KEY_ID") {
        ensure_s3(config).access_key_id = access_key_id;
    }
    if let Some(secret_access_key) = env.get_raw("AWS_SECRET_ACCESS_KEY") {
        ensure_s3(config).secret_access_key = secret_access_key;
    }

    Ok(())
}

fn ensure_s3(config: &mut RuntimeConfig) -> &mut S3Config {
    config.storage.s3.get_or_insert_with(S3Config::default)
}
