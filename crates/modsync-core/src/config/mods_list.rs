//! Desired-mod lists.
//!
//! A mods list is a JSON object mapping local mod name to workshop id:
//!
//! ```json
//! { "@cba_a3": "450814997", "@ace": "463939057" }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One desired mod: the name it is linked under and its content-store id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModDescriptor {
    pub name: String,
    pub id: String,
}

impl ModDescriptor {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ModDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" ({})", self.name, self.id)
    }
}

/// Set of mods keyed by unique name, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModList {
    mods: BTreeMap<String, String>,
}

impl ModList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mod, replacing the id of an existing entry with the same name.
    pub fn insert(&mut self, descriptor: ModDescriptor) {
        self.mods.insert(descriptor.name, descriptor.id);
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mods.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.mods.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = ModDescriptor> + '_ {
        self.mods
            .iter()
            .map(|(name, id)| ModDescriptor::new(name.clone(), id.clone()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.mods.keys().map(String::as_str)
    }
}

impl FromIterator<ModDescriptor> for ModList {
    fn from_iter<T: IntoIterator<Item = ModDescriptor>>(iter: T) -> Self {
        let mut list = ModList::new();
        for descriptor in iter {
            list.insert(descriptor);
        }
        list
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModsListError {
    #[error("Mods list not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read mods list {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mods list {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Mods list {} has an empty id for mod '{name}'", .path.display())]
    EmptyId { path: PathBuf, name: String },

    #[error("Mods list {} has an invalid entry '{name}': {reason}", .path.display())]
    InvalidEntry {
        path: PathBuf,
        name: String,
        reason: &'static str,
    },
}

/// Load a mods list from a JSON file.
pub fn load_mods_list(path: &Path) -> Result<ModList, ModsListError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ModsListError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ModsListError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse_mods_list(&content).map_err(|err| match err {
        ParseFailure::Json(source) => ModsListError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::EmptyId(name) => ModsListError::EmptyId {
            path: path.to_path_buf(),
            name,
        },
        ParseFailure::Invalid { name, reason } => ModsListError::InvalidEntry {
            path: path.to_path_buf(),
            name,
            reason,
        },
    })
}

enum ParseFailure {
    Json(serde_json::Error),
    EmptyId(String),
    Invalid { name: String, reason: &'static str },
}

fn parse_mods_list(content: &str) -> Result<ModList, ParseFailure> {
    let raw: BTreeMap<String, String> = serde_json::from_str(content).map_err(ParseFailure::Json)?;
    if let Some((name, _)) = raw.iter().find(|(_, id)| id.trim().is_empty()) {
        return Err(ParseFailure::EmptyId(name.clone()));
    }
    for (name, id) in &raw {
        if let Some(reason) = invalid_entry(name, id) {
            return Err(ParseFailure::Invalid {
                name: name.clone(),
                reason,
            });
        }
    }
    Ok(ModList { mods: raw })
}

/// Ids become directory names under the content store and names become link
/// names under the mods dir, so neither may leave its parent.
fn invalid_entry(name: &str, id: &str) -> Option<&'static str> {
    if !id.bytes().all(|b| b.is_ascii_digit()) {
        return Some("id must be numeric");
    }
    if name.trim().is_empty() {
        return Some("name must not be empty");
    }
    if name.contains(['/', '\\']) || name == "." || name.contains("..") {
        return Some("name must be a single path component");
    }
    None
}
