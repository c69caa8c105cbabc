// nport2lake-config - Runtime configuration
//
// Configuration comes from multiple sources, later ones winning:
// 1. Built-in defaults
// 2. Config file (explicit path, NPORT2LAKE_CONFIG path,
//    NPORT2LAKE_CONFIG_CONTENT inline TOML, or ./config.toml /
//    ./.nport2lake.toml)
// 3. Environment variables (NPORT2LAKE_* prefix, plus the standard
//    AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY pair)

use serde::{Deserialize, Serialize};

mod env;
mod sources;
mod validation;

pub use env::{apply_env_overrides, EnvSource, StdEnvSource, ENV_PREFIX};

/// Main runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub source: SecApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            source: SecApiConfig::default(),
            storage: StorageConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// SEC API bulk-download endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// SEC API authentication token. Required for any network operation;
    /// left optional so offline commands (--show-config) still work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// The SEC asks clients to identify themselves.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SecApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Staging storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Dataset prefix under which partitions are staged.
    #[serde(default = "default_dataset")]
    pub dataset: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs: Option<FsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Fs,
            dataset: default_dataset(),
            fs: Some(FsConfig::default()),
            s3: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Fs,
    S3,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Fs => write!(f, "fs"),
            StorageBackend::S3 => write!(f, "s3"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fs" => Ok(Self::Fs),
            "s3" => Ok(Self::S3),
            other => anyhow::bail!("unknown storage backend '{other}' (expected fs or s3)"),
        }
    }
}

/// Local filesystem staging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsConfig {
    pub path: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            path: "./data".to_string(),
        }
    }
}

/// S3-compatible staging (AWS S3 or MinIO via `endpoint`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,

    #[serde(default = "default_s3_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores such as MinIO.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_s3_region(),
            endpoint: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.sec-api.io/bulk/form-nport".to_string()
}

fn default_user_agent() -> String {
    format!("nport2lake/{}", env!("CARGO_PKG_VERSION"))
}

fn default_dataset() -> String {
    "nport_bronze".to_string()
}

fn default_s3_region() -> String {
    "us-east-1".to_string()
}

impl RuntimeConfig {
    /// Load from default locations with environment overrides applied.
    pub fn load() -> anyhow::Result<Self> {
        sources::load_config()
    }

    /// Load from an explicit file path (CLI `--config`), then apply
    /// environment overrides.
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        sources::load_from_path(path)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validation::validate_config(self)
    }
}

/// Shorten a secret for display: first four characters, then an ellipsis.
/// Anything too short to keep a prefix is fully masked. Counts characters,
/// not bytes, so multi-byte input cannot split a code point.
pub fn redact_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(unset)".to_string();
    }
    if secret.chars().count() > 8 {
        let prefix: String = secret.chars().take(4).collect();
        format!("{prefix}…")
    } else {
        "****".to_string()
    }
}
