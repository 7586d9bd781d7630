//! Configuration schema for modsync.toml
//!
//! Every field has a default matching the stock deployment layout, so an
//! absent or partial file is valid:
//!
//! ```toml
//! changelog_url = "https://steamcommunity.com/sharedfiles/filedetails/changelog"
//!
//! [steamcmd]
//! binary = "/home/arma/steamcmd/steamcmd.sh"
//!
//! [arma3]
//! app_id = "233780"
//! server_dir = "/home/arma/steamcmd/arma3"
//!
//! [arma3.mods]
//! workshop_app_id = "107410"
//! default_mods_list = "arga"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::ServerKind;

const STEAMCMD_ROOT: &str = "/home/arma/steamcmd";
const DEFAULT_CHANGELOG_URL: &str = "https://steamcommunity.com/sharedfiles/filedetails/changelog";

/// Root configuration structure for modsync.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModsyncConfig {
    /// Base URL of the workshop changelog page; the mod id is appended.
    pub changelog_url: String,

    /// SteamCMD invocation settings
    pub steamcmd: SteamCmdConfig,

    /// Arma 3 dedicated server
    pub arma3: ServerConfig,

    /// Arma Reforger dedicated server
    pub reforger: ServerConfig,
}

impl Default for ModsyncConfig {
    fn default() -> Self {
        Self {
            changelog_url: DEFAULT_CHANGELOG_URL.to_string(),
            steamcmd: SteamCmdConfig::default(),
            arma3: ServerConfig::arma3(),
            reforger: ServerConfig::reforger(),
        }
    }
}

impl ModsyncConfig {
    pub fn server(&self, kind: ServerKind) -> &ServerConfig {
        match kind {
            ServerKind::Arma3 => &self.arma3,
            ServerKind::Reforger => &self.reforger,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.changelog_url.trim().is_empty() {
            anyhow::bail!("changelog_url must not be empty");
        }
        url::Url::parse(&self.changelog_url)
            .map_err(|e| anyhow::anyhow!("Invalid changelog_url '{}': {}", self.changelog_url, e))?;
        for (kind, server) in [
            (ServerKind::Arma3, &self.arma3),
            (ServerKind::Reforger, &self.reforger),
        ] {
            if server.app_id.trim().is_empty() {
                anyhow::bail!("[{}] app_id must not be empty", kind.as_str());
            }
            if let Some(mods) = &server.mods {
                if mods.workshop_app_id.trim().is_empty() {
                    anyhow::bail!("[{}.mods] workshop_app_id must not be empty", kind.as_str());
                }
                if mods.default_mods_list.trim().is_empty() {
                    anyhow::bail!(
                        "[{}.mods] default_mods_list must not be empty",
                        kind.as_str()
                    );
                }
            }
        }
        Ok(())
    }
}

/// How to invoke the external content-fetch tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamCmdConfig {
    /// Path to steamcmd.sh
    pub binary: PathBuf,

    /// Login user; anonymous login when unset. Falls back to `STEAM_USER`.
    pub user: Option<String>,

    /// Login password. Falls back to `STEAM_PASS`.
    pub password: Option<String>,
}

impl Default for SteamCmdConfig {
    fn default() -> Self {
        Self {
            binary: Path::new(STEAMCMD_ROOT).join("steamcmd.sh"),
            user: None,
            password: None,
        }
    }
}

/// One dedicated server installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Steam app id of the dedicated server
    pub app_id: String,

    /// Install directory passed to `+force_install_dir`
    pub server_dir: PathBuf,

    /// Workshop mod layout; absent for servers that do not consume workshop mods
    #[serde(default)]
    pub mods: Option<ModsLayout>,
}

impl ServerConfig {
    pub fn arma3() -> Self {
        let server_dir = Path::new(STEAMCMD_ROOT).join("arma3");
        Self {
            app_id: "233780".to_string(),
            mods: Some(ModsLayout::for_server(&server_dir, "107410")),
            server_dir,
        }
    }

    pub fn reforger() -> Self {
        Self {
            app_id: "1874900".to_string(),
            server_dir: Path::new(STEAMCMD_ROOT).join("reforger"),
            mods: None,
        }
    }
}

/// Filesystem roots for workshop mods of one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModsLayout {
    /// Steam app id that owns the workshop items
    pub workshop_app_id: String,

    /// Content store: where the fetch tool lands items, keyed by mod id
    pub workshop_dir: PathBuf,

    /// Server root where name-based symlinks are created
    pub mods_dir: PathBuf,

    /// Flat trusted-keys directory of the server
    pub keys_dir: PathBuf,

    /// Directory holding `<name>.json` mods lists
    pub mods_list_dir: PathBuf,

    /// Mods list used when none is named
    #[serde(default = "default_mods_list")]
    pub default_mods_list: String,

    /// File extensions recognized as signing keys
    #[serde(default = "default_key_extensions")]
    pub key_extensions: Vec<String>,
}

fn default_mods_list() -> String {
    "arga".to_string()
}

fn default_key_extensions() -> Vec<String> {
    vec!["bikey".to_string()]
}

impl ModsLayout {
    /// Layout used by SteamCMD when `+force_install_dir` is `server_dir`.
    pub fn for_server(server_dir: &Path, workshop_app_id: &str) -> Self {
        Self {
            workshop_app_id: workshop_app_id.to_string(),
            workshop_dir: server_dir
                .join("steamapps")
                .join("workshop")
                .join("content")
                .join(workshop_app_id),
            mods_dir: server_dir.to_path_buf(),
            keys_dir: server_dir.join("keys"),
            mods_list_dir: PathBuf::from("/home/arma/scripts/arga-server-updater/mods_lists"),
            default_mods_list: default_mods_list(),
            key_extensions: default_key_extensions(),
        }
    }

    /// Content-store directory of a mod.
    pub fn content_path(&self, mod_id: &str) -> PathBuf {
        self.workshop_dir.join(mod_id)
    }

    /// Name-based symlink location of a mod in the server root.
    pub fn link_path(&self, mod_name: &str) -> PathBuf {
        self.mods_dir.join(mod_name)
    }

    /// Path of a named mods list file.
    pub fn mods_list_path(&self, name: &str) -> PathBuf {
        self.mods_list_dir.join(format!("{}.json", name))
    }
}
