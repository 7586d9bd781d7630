//! Update command implementation.
//!
//! Updates a dedicated server and its workshop mods, then restores the
//! on-disk layout the server expects for every freshly fetched mod.

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{ModList, ModsLayout, ModsyncConfig, ServerKind, load_mods_list};
use crate::fetch::{ContentFetcher, FetchTarget};
use crate::fs::{KeyReport, LinkReport, NormalizeReport, link_mods, normalize_mods, propagate_keys};
use crate::reconcile::{ReconcileReport, Reconciler, RetryPolicy};
use crate::staleness::ChangelogSource;

/// Report from a mods update.
#[derive(Debug, Clone, Default)]
pub struct UpdateModsReport {
    pub reconcile: ReconcileReport,
    /// Layout stage reports; `None` when nothing was updated and the stages
    /// did not run.
    pub normalize: Option<NormalizeReport>,
    pub links: Option<LinkReport>,
    pub keys: Option<KeyReport>,
}

impl UpdateModsReport {
    pub fn nothing_to_do(&self) -> bool {
        self.reconcile.nothing_to_do()
    }
}

/// Report from a server + mods update.
#[derive(Debug, Clone, Default)]
pub struct UpdateAllReport {
    /// Server fetch failure, if any; the mods update runs regardless.
    pub server_error: Option<String>,
    pub mods: UpdateModsReport,
}

/// Update command orchestrator for one server.
pub struct UpdateCommand {
    server: ServerKind,
    config: ModsyncConfig,
    fetcher: Box<dyn ContentFetcher>,
    changelog: Box<dyn ChangelogSource>,
    policy: RetryPolicy,
}

impl UpdateCommand {
    pub fn new(
        server: ServerKind,
        config: ModsyncConfig,
        fetcher: Box<dyn ContentFetcher>,
        changelog: Box<dyn ChangelogSource>,
    ) -> Self {
        Self {
            server,
            config,
            fetcher,
            changelog,
            policy: RetryPolicy::default(),
        }
    }

    /// Set the fetch retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn server(&self) -> ServerKind {
        self.server
    }

    pub fn config(&self) -> &ModsyncConfig {
        &self.config
    }

    /// Whether the server consumes workshop mods at all.
    pub fn supports_mods(&self) -> bool {
        self.config.server(self.server).mods.is_some()
    }

    fn mods_layout(&self) -> anyhow::Result<&ModsLayout> {
        self.config.server(self.server).mods.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "{} server has no workshop mods configured",
                self.server.display_name()
            )
        })
    }

    /// Load a named mods list, or the server's default list when `None`.
    pub fn load_mods(&self, list_name: Option<&str>) -> anyhow::Result<ModList> {
        let layout = self.mods_layout()?;
        let name = list_name.unwrap_or(&layout.default_mods_list);
        let mods = load_mods_list(&layout.mods_list_path(name))
            .with_context(|| format!("Failed to load mods list '{}'", name))?;
        info!(list = name, count = mods.len(), "loaded mods list");
        Ok(mods)
    }

    /// Install or update the dedicated server itself.
    pub fn update_server(&self) -> anyhow::Result<()> {
        let server = self.config.server(self.server);
        info!(
            "Updating {} server ({})",
            self.server.display_name(),
            server.app_id
        );
        self.fetcher
            .fetch(&FetchTarget::server(&server.app_id))
            .with_context(|| format!("Failed to update {} server", self.server.display_name()))
    }

    /// Reconcile the mods list, then normalize, link, and copy keys for the
    /// mods fetched in this pass.
    ///
    /// When no mod was fetched the layout stages are skipped entirely.
    pub fn update_mods(&self, list_name: Option<&str>) -> anyhow::Result<UpdateModsReport> {
        let layout = self.mods_layout()?;
        let desired = self.load_mods(list_name)?;

        let reconciler = Reconciler::new(
            layout,
            self.fetcher.as_ref(),
            self.changelog.as_ref(),
            self.policy,
        );
        let reconcile = reconciler.reconcile(&desired);

        if reconcile.nothing_to_do() {
            info!("All MODs are updated");
            return Ok(UpdateModsReport {
                reconcile,
                ..UpdateModsReport::default()
            });
        }

        let normalize = normalize_mods(layout, &reconcile.updated);
        let links = link_mods(layout, &reconcile.updated);
        let keys = propagate_keys(layout, &reconcile.updated);

        Ok(UpdateModsReport {
            reconcile,
            normalize: Some(normalize),
            links: Some(links),
            keys: Some(keys),
        })
    }

    /// Update the server, then its mods.
    pub fn update_all(&self, list_name: Option<&str>) -> anyhow::Result<UpdateAllReport> {
        let server_error = match self.update_server() {
            Ok(()) => None,
            Err(err) => {
                warn!("{:#}", err);
                Some(format!("{:#}", err))
            }
        };
        let mods = self.update_mods(list_name)?;
        Ok(UpdateAllReport { server_error, mods })
    }

    /// Create missing symlinks for every mod of the list.
    pub fn create_links(&self, list_name: Option<&str>) -> anyhow::Result<LinkReport> {
        let mods = self.load_mods(list_name)?;
        Ok(link_mods(self.mods_layout()?, &mods))
    }

    /// Lower-case the content of every mod of the list.
    pub fn normalize(&self, list_name: Option<&str>) -> anyhow::Result<NormalizeReport> {
        let mods = self.load_mods(list_name)?;
        Ok(normalize_mods(self.mods_layout()?, &mods))
    }

    /// Copy signing keys of every mod of the list.
    pub fn copy_keys(&self, list_name: Option<&str>) -> anyhow::Result<KeyReport> {
        let mods = self.load_mods(list_name)?;
        Ok(propagate_keys(self.mods_layout()?, &mods))
    }
}
