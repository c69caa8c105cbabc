// Configuration source loading.
//
// Priority order:
// 1. Environment variables (NPORT2LAKE_* prefix)
// 2. Config file path from NPORT2LAKE_CONFIG
// 3. Inline config content from NPORT2LAKE_CONFIG_CONTENT
// 4. Default config files (./config.toml, ./.nport2lake.toml)
// 5. Built-in defaults

use crate::env::{apply_env_overrides, EnvSource, StdEnvSource};
use crate::RuntimeConfig;
use anyhow::{Context, Result};
use std::path::Path;

const DEFAULT_CONFIG_FILES: &[&str] = &["./config.toml", "./.nport2lake.toml"];

/// Load configuration from default locations, then apply environment
/// overrides and validate.
pub fn load_config() -> Result<RuntimeConfig> {
    let env = StdEnvSource;
    let mut config = load_from_sources(&env, DEFAULT_CONFIG_FILES)?.unwrap_or_default();
    apply_env_overrides(&mut config, &env)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a specific file (CLI `--config` flag). Errors if
/// the file is missing or unparseable; environment overrides still apply.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    let path = path.as_ref();
    let mut config = read_config_file(path)?;
    apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

fn load_from_sources<E: EnvSource>(
    env: &E,
    default_files: &[&str],
) -> Result<Option<RuntimeConfig>> {
    if let Some(path) = env.get("CONFIG") {
        return read_config_file(Path::new(&path)).map(Some);
    }

    if let Some(content) = env.get("CONFIG_CONTENT") {
        let config = toml::from_str(&content)
            .context("Failed to parse inline config from NPORT2LAKE_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    for candidate in default_files {
        if Path::new(candidate).exists() {
            return read_config_file(Path::new(candidate)).map(Some);
        }
    }

    Ok(None)
}

fn read_config_file(path: &Path) -> Result<RuntimeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
