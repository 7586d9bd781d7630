//! Content fetching through the external distribution tool.
//!
//! A fetch is fire-and-forget: the returned `Result` only reports whether the
//! tool could be run and how it exited. Whether a mod actually landed is
//! decided by the caller by looking at the content store afterwards.

mod steamcmd;

pub use steamcmd::SteamCmd;

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    /// Untargeted install/update of a dedicated server.
    Server { app_id: String },
    /// One workshop item.
    Mod {
        workshop_app_id: String,
        mod_id: String,
    },
}

impl FetchTarget {
    pub fn server(app_id: impl Into<String>) -> Self {
        FetchTarget::Server {
            app_id: app_id.into(),
        }
    }

    pub fn workshop_mod(workshop_app_id: impl Into<String>, mod_id: impl Into<String>) -> Self {
        FetchTarget::Mod {
            workshop_app_id: workshop_app_id.into(),
            mod_id: mod_id.into(),
        }
    }
}

impl std::fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchTarget::Server { app_id } => write!(f, "server {}", app_id),
            FetchTarget::Mod {
                workshop_app_id,
                mod_id,
            } => write!(f, "workshop item {}/{}", workshop_app_id, mod_id),
        }
    }
}

/// Runs one invocation of the external fetch tool.
pub trait ContentFetcher {
    fn fetch(&self, target: &FetchTarget) -> anyhow::Result<()>;
}

impl<T: ContentFetcher + ?Sized> ContentFetcher for &T {
    fn fetch(&self, target: &FetchTarget) -> anyhow::Result<()> {
        (**self).fetch(target)
    }
}

impl<T: ContentFetcher + ?Sized> ContentFetcher for Box<T> {
    fn fetch(&self, target: &FetchTarget) -> anyhow::Result<()> {
        (**self).fetch(target)
    }
}
