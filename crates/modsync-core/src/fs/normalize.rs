//! Lower-case normalization of mod content trees.
//!
//! The server resolves mod files case-sensitively against lower-case names,
//! while workshop uploads keep whatever case the author used.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{ModList, ModsLayout};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Number of entries renamed
    pub renamed: usize,
    /// Entries that could not be renamed (or read)
    pub failed: Vec<PathBuf>,
}

impl NormalizeReport {
    fn merge(&mut self, other: NormalizeReport) {
        self.renamed += other.renamed;
        self.failed.extend(other.failed);
    }
}

/// Normalize the content directories of `mods`.
pub fn normalize_mods(layout: &ModsLayout, mods: &ModList) -> NormalizeReport {
    info!("Converting uppercase files/folders to lowercase...");
    let mut report = NormalizeReport::default();
    for descriptor in mods.iter() {
        report.merge(normalize_tree(&layout.content_path(&descriptor.id)));
    }
    report
}

/// Rename every entry below `root` whose name has upper-case characters.
///
/// The walk is bottom-up so a directory is renamed only after all of its
/// children, keeping the collected child paths valid. `root` itself keeps its
/// name. Failures are logged and recorded; the walk always completes.
pub fn normalize_tree(root: &Path) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    let entries: Vec<_> = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .collect();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error walking {}: {}", root.display(), err);
                report
                    .failed
                    .push(err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()));
                continue;
            }
        };

        let Some(name) = entry.file_name().to_str() else {
            warn!("Skipping non UTF-8 name: {}", entry.path().display());
            continue;
        };
        let lower = name.to_lowercase();
        if lower == name {
            continue;
        }

        let from = entry.path();
        let to = from.with_file_name(&lower);
        match rename_entry(from, &to) {
            Ok(()) => {
                debug!("Renamed: {} -> {}", name, to.display());
                report.renamed += 1;
            }
            Err(err) => {
                warn!("Error renaming {}: {:#}", from.display(), err);
                report.failed.push(from.to_path_buf());
            }
        }
    }

    report
}

fn rename_entry(from: &Path, to: &Path) -> anyhow::Result<()> {
    if has_exact_entry(to) {
        anyhow::bail!("{} already exists", to.display());
    }
    fs::rename(from, to)?;
    Ok(())
}

/// Whether the parent of `path` lists an entry named exactly like it.
///
/// A metadata lookup would also match `from` itself on case-insensitive
/// filesystems.
fn has_exact_entry(path: &Path) -> bool {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return false;
    };
    match fs::read_dir(parent) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .any(|entry| entry.file_name() == name),
        Err(_) => false,
    }
}
