//! Signing-key propagation into the server's trusted-keys directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{ModList, ModsLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Copied(usize),
    NothingToCopy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyReport {
    /// Distinct destination paths written
    pub copied: Vec<PathBuf>,
    /// Source keys that could not be copied
    pub failed: Vec<PathBuf>,
}

impl KeyReport {
    pub fn outcome(&self) -> KeyOutcome {
        if self.copied.is_empty() {
            KeyOutcome::NothingToCopy
        } else {
            KeyOutcome::Copied(self.copied.len())
        }
    }
}

/// Copy every signing key found under the content of `mods` into `layout.keys_dir`.
///
/// Keys land flat by file name; a same-named key already present is
/// overwritten.
pub fn propagate_keys(layout: &ModsLayout, mods: &ModList) -> KeyReport {
    info!("Start copy of Mods sign key files...");
    let mut report = KeyReport::default();

    if let Err(err) = fs::create_dir_all(&layout.keys_dir) {
        warn!(
            "Failed to create keys directory {}: {}",
            layout.keys_dir.display(),
            err
        );
    }

    for descriptor in mods.iter() {
        let root = layout.content_path(&descriptor.id);
        for source in find_keys(&root, &layout.key_extensions) {
            let Some(file_name) = source.file_name() else {
                continue;
            };
            let destination = layout.keys_dir.join(file_name);
            match fs::copy(&source, &destination) {
                Ok(_) => {
                    debug!("Copy {} file", file_name.to_string_lossy());
                    if !report.copied.contains(&destination) {
                        report.copied.push(destination);
                    }
                }
                Err(err) => {
                    warn!(
                        "Failed to copy {} to {}: {}",
                        source.display(),
                        destination.display(),
                        err
                    );
                    report.failed.push(source);
                }
            }
        }
    }

    match report.outcome() {
        KeyOutcome::NothingToCopy => info!("There are no MODs sign key files to copy"),
        KeyOutcome::Copied(count) => {
            info!(count, "MODs sign key files were successfully copied.")
        }
    }
    report
}

/// Files below `root` whose extension is one of `extensions` (case-insensitive).
pub fn find_keys(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Error walking {}: {}", root.display(), err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_signing_key(entry.path(), extensions))
        .map(|entry| entry.into_path())
        .collect()
}

fn is_signing_key(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions.iter().any(|known| known.eq_ignore_ascii_case(ext))
}
