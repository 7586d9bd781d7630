//! Modsync Core Library
//!
//! Keeps a dedicated game server and its workshop mods up to date through
//! SteamCMD: reconciles a desired mod list against the content store, then
//! restores the on-disk layout the server expects (lower-case names, symlinks,
//! signing keys).

pub mod commands;
pub mod config;
pub mod context;
pub mod fetch;
pub mod fs;
pub mod reconcile;
pub mod staleness;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigStore, ModDescriptor, ModList, ModsLayout, ModsyncConfig, ServerConfig, ServerKind,
    };

    // Commands
    pub use crate::commands::{UpdateAllReport, UpdateCommand, UpdateModsReport};
    pub use crate::context::AppContext;

    // Engine
    pub use crate::fetch::{ContentFetcher, FetchTarget, SteamCmd};
    pub use crate::reconcile::{ModOutcome, PlanEntry, ReconcileReport, Reconciler, RetryPolicy};
    pub use crate::staleness::{ChangelogSource, HttpChangelogSource, Staleness, StalenessOracle};

    // Filesystem
    pub use crate::fs::{KeyOutcome, KeyReport, LinkReport, NormalizeReport};
}
