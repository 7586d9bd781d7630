//! SteamCMD adapter.

use std::path::PathBuf;
use std::process::Command;

use anyhow::Context;

use super::{ContentFetcher, FetchTarget};
use crate::config::SteamCmdConfig;

/// Invokes `steamcmd.sh` synchronously with inherited stdio.
#[derive(Debug, Clone)]
pub struct SteamCmd {
    binary: PathBuf,
    install_dir: PathBuf,
    user: Option<String>,
    password: Option<String>,
}

impl SteamCmd {
    /// Create an adapter installing into `install_dir` (`+force_install_dir`).
    pub fn new(config: &SteamCmdConfig, install_dir: PathBuf) -> Self {
        Self {
            binary: config.binary.clone(),
            install_dir,
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }

    /// Command-line arguments for one invocation.
    pub fn args(&self, target: &FetchTarget) -> Vec<String> {
        let mut args = vec![
            "+force_install_dir".to_string(),
            self.install_dir.display().to_string(),
            "+login".to_string(),
        ];
        match &self.user {
            Some(user) => {
                args.push(user.clone());
                if let Some(password) = &self.password {
                    args.push(password.clone());
                }
            }
            None => args.push("anonymous".to_string()),
        }
        match target {
            FetchTarget::Server { app_id } => {
                args.extend(["+app_update".to_string(), app_id.clone()]);
            }
            FetchTarget::Mod {
                workshop_app_id,
                mod_id,
            } => {
                args.extend([
                    "+workshop_download_item".to_string(),
                    workshop_app_id.clone(),
                    mod_id.clone(),
                ]);
            }
        }
        args.extend(["validate".to_string(), "+quit".to_string()]);
        args
    }
}

impl ContentFetcher for SteamCmd {
    fn fetch(&self, target: &FetchTarget) -> anyhow::Result<()> {
        let status = Command::new(&self.binary)
            .args(self.args(target))
            .status()
            .with_context(|| {
                format!(
                    "Failed to run {} for {}",
                    self.binary.display(),
                    target
                )
            })?;
        if !status.success() {
            anyhow::bail!("steamcmd exited with {} for {}", status, target);
        }
        Ok(())
    }
}
