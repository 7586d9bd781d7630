//! Config store for loading modsync.toml.

use std::path::{Path, PathBuf};

use super::{ModsyncConfig, parser};

pub const STEAM_USER_ENV: &str = "STEAM_USER";
pub const STEAM_PASS_ENV: &str = "STEAM_PASS";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store at `<config_dir>/modsync/modsync.toml`.
    pub fn from_default_location() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("modsync");
        Ok(Self::from_path(config_dir.join("modsync.toml")))
    }

    pub fn from_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config file, falling back to defaults when it does not exist.
    ///
    /// SteamCMD credentials missing from the file are taken from the
    /// `STEAM_USER` / `STEAM_PASS` environment variables.
    pub fn load(&self) -> anyhow::Result<ModsyncConfig> {
        let mut config = if self.config_path.exists() {
            parser::parse_modsync_toml(&self.config_path)?
        } else {
            ModsyncConfig::default()
        };
        apply_credentials_from_env(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }
}

fn apply_credentials_from_env(
    config: &mut ModsyncConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if config.steamcmd.user.is_none() {
        config.steamcmd.user = lookup(STEAM_USER_ENV).filter(|v| !v.is_empty());
    }
    if config.steamcmd.password.is_none() {
        config.steamcmd.password = lookup(STEAM_PASS_ENV).filter(|v| !v.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_credentials_fill_missing_fields() {
        let mut config = ModsyncConfig::default();
        apply_credentials_from_env(&mut config, |key| match key {
            STEAM_USER_ENV => Some("deploy".to_string()),
            STEAM_PASS_ENV => Some("hunter2".to_string()),
            _ => None,
        });
        assert_eq!(config.steamcmd.user.as_deref(), Some("deploy"));
        assert_eq!(config.steamcmd.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_file_credentials_win_over_env() {
        let mut config = ModsyncConfig::default();
        config.steamcmd.user = Some("from-file".to_string());
        apply_credentials_from_env(&mut config, |_| Some("from-env".to_string()));
        assert_eq!(config.steamcmd.user.as_deref(), Some("from-file"));
        assert_eq!(config.steamcmd.password.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = ModsyncConfig::default();
        apply_credentials_from_env(&mut config, |_| Some(String::new()));
        assert!(config.steamcmd.user.is_none());
    }
}
