//! Name-based symlinks from the server root into the content store.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{ModList, ModsLayout};

/// Result of linking one mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// A new symlink was created
    Created,
    /// A symlink was already there; left untouched
    Existing,
    /// The content directory does not exist; no link
    MissingTarget,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
    pub missing: Vec<String>,
    pub failed: Vec<String>,
}

/// Create `mods_dir/<name> -> workshop_dir/<id>` for every mod in `mods`.
///
/// Existing symlinks are never repaired or replaced, and links for mods that
/// are no longer desired are never removed.
pub fn link_mods(layout: &ModsLayout, mods: &ModList) -> LinkReport {
    info!("Creating symlinks...");
    let mut report = LinkReport::default();

    for descriptor in mods.iter() {
        let link_path = layout.link_path(&descriptor.name);
        let target_path = layout.content_path(&descriptor.id);

        match link_one(&link_path, &target_path) {
            Ok(LinkStatus::Created) => {
                info!("Creating symlink '{}'...", link_path.display());
                report.created.push(descriptor.name);
            }
            Ok(LinkStatus::Existing) => report.existing.push(descriptor.name),
            Ok(LinkStatus::MissingTarget) => {
                warn!(
                    "Mod '{}' does not exist! ({})",
                    descriptor.name,
                    target_path.display()
                );
                report.missing.push(descriptor.name);
            }
            Err(err) => {
                warn!("Failed to link mod '{}': {:#}", descriptor.name, err);
                report.failed.push(descriptor.name);
            }
        }
    }

    report
}

/// Idempotently create a directory symlink at `link_path` pointing to `target_path`.
pub fn link_one(link_path: &Path, target_path: &Path) -> anyhow::Result<LinkStatus> {
    if !target_path.is_dir() {
        return Ok(LinkStatus::MissingTarget);
    }

    match fs::symlink_metadata(link_path) {
        Ok(meta) if meta.file_type().is_symlink() => return Ok(LinkStatus::Existing),
        Ok(_) => anyhow::bail!(
            "{} exists and is not a symlink",
            link_path.display()
        ),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!("Failed to stat {}", link_path.display())));
        }
    }

    create_dir_symlink(target_path, link_path).with_context(|| {
        format!(
            "Failed to create symlink {} -> {}",
            link_path.display(),
            target_path.display()
        )
    })?;
    Ok(LinkStatus::Created)
}

#[cfg(unix)]
fn create_dir_symlink(src_dir: &Path, dst_link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src_dir, dst_link)
}

#[cfg(windows)]
fn create_dir_symlink(src_dir: &Path, dst_link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(src_dir, dst_link)
}

#[cfg(not(any(unix, windows)))]
fn create_dir_symlink(_src_dir: &Path, _dst_link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "Symlinks are not supported on this platform",
    ))
}
