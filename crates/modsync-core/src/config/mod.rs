//! Configuration for servers, the fetch tool, and desired-mod lists.

pub mod mods_list;
pub mod parser;
pub mod schema;
pub mod store;

pub use mods_list::{ModDescriptor, ModList, ModsListError, load_mods_list};
pub use parser::{parse_modsync_toml, parse_modsync_toml_str};
pub use schema::{ModsLayout, ModsyncConfig, ServerConfig, SteamCmdConfig};
pub use store::ConfigStore;

/// Dedicated server flavours managed by modsync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerKind {
    Arma3,
    Reforger,
}

impl ServerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ServerKind::Arma3 => "arma3",
            ServerKind::Reforger => "reforger",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ServerKind::Arma3 => "Arma 3",
            ServerKind::Reforger => "Arma Reforger",
        }
    }
}
