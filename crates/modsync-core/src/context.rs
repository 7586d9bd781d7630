//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use crate::commands::UpdateCommand;
use crate::config::{ConfigStore, ModsyncConfig, ServerKind};
use crate::fetch::SteamCmd;
use crate::staleness::HttpChangelogSource;

/// Loaded configuration plus factories for the concrete collaborators.
///
/// Frontends create this once and build commands from it.
#[derive(Debug, Clone)]
pub struct AppContext {
    config_path: PathBuf,
    config: ModsyncConfig,
}

impl AppContext {
    /// Load from `config_path`, or from the default location when `None`.
    pub fn load(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let store = match config_path {
            Some(path) => ConfigStore::from_path(path),
            None => ConfigStore::from_default_location()?,
        };
        let config = store.load()?;
        Ok(Self::with_config(store.config_path().to_path_buf(), config))
    }

    /// Create context around an already loaded config (for testing).
    pub fn with_config(config_path: PathBuf, config: ModsyncConfig) -> Self {
        Self {
            config_path,
            config,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &ModsyncConfig {
        &self.config
    }

    /// SteamCMD adapter installing into the server's directory.
    pub fn steamcmd(&self, server: ServerKind) -> SteamCmd {
        SteamCmd::new(
            &self.config.steamcmd,
            self.config.server(server).server_dir.clone(),
        )
    }

    pub fn changelog_source(&self) -> anyhow::Result<HttpChangelogSource> {
        HttpChangelogSource::new(&self.config.changelog_url)
    }

    /// Update command wired to SteamCMD and the HTTP changelog.
    pub fn update_command(&self, server: ServerKind) -> anyhow::Result<UpdateCommand> {
        Ok(UpdateCommand::new(
            server,
            self.config.clone(),
            Box::new(self.steamcmd(server)),
            Box::new(self.changelog_source()?),
        ))
    }
}
