//! modsync.toml loading

use super::schema::ModsyncConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Read and parse modsync.toml
pub fn parse_modsync_toml(path: &Path) -> Result<ModsyncConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_modsync_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse modsync.toml content from string
pub fn parse_modsync_toml_str(content: &str) -> Result<ModsyncConfig> {
    let config: ModsyncConfig = toml::from_str(content).context("Failed to parse modsync.toml")?;

    config.validate()?;

    Ok(config)
}
