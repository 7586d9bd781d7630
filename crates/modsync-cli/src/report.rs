//! Console rendering of command reports.

use std::io::Write;

use anyhow::Result;
use console::style;

use modsync_core::commands::{UpdateAllReport, UpdateModsReport};
use modsync_core::fs::{KeyOutcome, KeyReport, LinkReport, NormalizeReport};
use modsync_core::reconcile::{ModOutcome, ReconcileReport};

pub fn print_update_all<W: Write>(w: &mut W, report: &UpdateAllReport) -> Result<()> {
    if let Some(err) = &report.server_error {
        writeln!(w, "{} {}", style("✗").red(), err)?;
    }
    print_update_mods(w, &report.mods)
}

pub fn print_update_mods<W: Write>(w: &mut W, report: &UpdateModsReport) -> Result<()> {
    print_reconcile(w, &report.reconcile)?;
    if report.nothing_to_do() {
        writeln!(w, "All MODs are updated")?;
        return Ok(());
    }
    if let Some(normalize) = &report.normalize {
        print_normalize(w, normalize)?;
    }
    if let Some(links) = &report.links {
        print_links(w, links)?;
    }
    if let Some(keys) = &report.keys {
        print_keys(w, keys)?;
    }
    Ok(())
}

pub fn print_reconcile<W: Write>(w: &mut W, report: &ReconcileReport) -> Result<()> {
    for entry in &report.entries {
        match entry.outcome {
            ModOutcome::Skipped => writeln!(
                w,
                "  {} {} up to date",
                style("-").dim(),
                entry.descriptor
            )?,
            ModOutcome::Updated => writeln!(
                w,
                "  {} {} updated ({} attempt(s))",
                style("✓").green(),
                entry.descriptor,
                entry.fetch_attempts
            )?,
            ModOutcome::Failed => writeln!(
                w,
                "  {} {} failed after {} attempt(s)",
                style("✗").red(),
                entry.descriptor,
                entry.fetch_attempts
            )?,
        }
    }
    Ok(())
}

pub fn print_normalize<W: Write>(w: &mut W, report: &NormalizeReport) -> Result<()> {
    writeln!(w, "Renamed {} entries to lower case", report.renamed)?;
    for path in &report.failed {
        writeln!(w, "  {} Error renaming {}", style("✗").red(), path.display())?;
    }
    Ok(())
}

pub fn print_links<W: Write>(w: &mut W, report: &LinkReport) -> Result<()> {
    for name in &report.created {
        writeln!(w, "  {} Created symlink '{}'", style("✓").green(), name)?;
    }
    for name in &report.missing {
        writeln!(w, "  {} Mod '{}' does not exist!", style("!").yellow(), name)?;
    }
    for name in &report.failed {
        writeln!(w, "  {} Failed to link '{}'", style("✗").red(), name)?;
    }
    writeln!(
        w,
        "Symlinks: {} created, {} already present",
        report.created.len(),
        report.existing.len()
    )?;
    Ok(())
}

pub fn print_keys<W: Write>(w: &mut W, report: &KeyReport) -> Result<()> {
    for path in &report.failed {
        writeln!(w, "  {} Failed to copy {}", style("✗").red(), path.display())?;
    }
    match report.outcome() {
        KeyOutcome::NothingToCopy => writeln!(w, "There are no MODs sign key files to copy")?,
        KeyOutcome::Copied(count) => writeln!(
            w,
            "MODs sign key files were successfully copied ({})",
            count
        )?,
    }
    Ok(())
}
