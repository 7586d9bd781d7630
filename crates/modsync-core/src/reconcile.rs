//! Reconciliation of a desired mod set against the content store.
//!
//! Each mod ends in one of three states:
//! - `Skipped`: present and fresh, nothing fetched
//! - `Updated`: missing (or stale and removed) and fetched during this pass
//! - `Failed`: the content directory never appeared within the retry budget
//!
//! # Polling contract
//!
//! The external fetch tool is unreliable and its exit status is not trusted.
//! After every attempt the content directory is checked; its existence is the
//! only success signal. Attempts are separated by a fixed pause and bounded by
//! [`RetryPolicy::max_attempts`].

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{ModDescriptor, ModList, ModsLayout};
use crate::fetch::{ContentFetcher, FetchTarget};
use crate::staleness::{ChangelogSource, Staleness, StalenessOracle};

/// Bounded retry settings for mod fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_interval: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Same budget without pauses between attempts.
    pub fn without_delay(self) -> Self {
        Self {
            retry_interval: Duration::ZERO,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModOutcome {
    Skipped,
    Updated,
    Failed,
}

/// What happened to one mod during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub descriptor: ModDescriptor,
    /// The content directory existed when the pass started
    pub currently_present: bool,
    /// The installed content was judged stale and removed
    pub needs_update: bool,
    pub fetch_attempts: u32,
    pub outcome: ModOutcome,
}

impl PlanEntry {
    pub fn succeeded(&self) -> bool {
        self.outcome == ModOutcome::Updated
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub entries: Vec<PlanEntry>,
    /// Mods fetched during this pass; the only input to layout stages.
    pub updated: ModList,
}

impl ReconcileReport {
    pub fn nothing_to_do(&self) -> bool {
        self.updated.is_empty()
    }

    pub fn entry(&self, name: &str) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.descriptor.name == name)
    }

    pub fn with_outcome(&self, outcome: ModOutcome) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(move |e| e.outcome == outcome)
    }
}

/// Drives a desired mod set to completion, one mod at a time.
pub struct Reconciler<'a> {
    layout: &'a ModsLayout,
    fetcher: &'a dyn ContentFetcher,
    oracle: StalenessOracle<&'a dyn ChangelogSource>,
    policy: RetryPolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        layout: &'a ModsLayout,
        fetcher: &'a dyn ContentFetcher,
        changelog: &'a dyn ChangelogSource,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            layout,
            fetcher,
            oracle: StalenessOracle::new(changelog),
            policy,
        }
    }

    /// Run one reconciliation pass.
    ///
    /// A mod that fails never stops the pass; it is reported and the next
    /// mod is processed.
    pub fn reconcile(&self, desired: &ModList) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for descriptor in desired.iter() {
            let entry = self.reconcile_one(descriptor);
            if entry.succeeded() {
                report.updated.insert(entry.descriptor.clone());
            }
            report.entries.push(entry);
        }

        info!(
            updated = report.updated.len(),
            skipped = report.with_outcome(ModOutcome::Skipped).count(),
            failed = report.with_outcome(ModOutcome::Failed).count(),
            "reconciliation pass finished"
        );
        report
    }

    fn reconcile_one(&self, descriptor: ModDescriptor) -> PlanEntry {
        let path = self.layout.content_path(&descriptor.id);
        let staleness = self.oracle.check(&descriptor.id, &path);

        let mut entry = PlanEntry {
            currently_present: staleness != Staleness::Missing,
            needs_update: staleness == Staleness::Stale,
            fetch_attempts: 0,
            outcome: ModOutcome::Skipped,
            descriptor,
        };

        match staleness {
            Staleness::Fresh => {
                info!("No update required for {}... SKIPPING", entry.descriptor);
                return entry;
            }
            Staleness::Stale => {
                info!("{} is outdated, removing {}", entry.descriptor, path.display());
                if let Err(err) = std::fs::remove_dir_all(&path) {
                    warn!(
                        "Failed to remove outdated {} at {}: {}",
                        entry.descriptor,
                        path.display(),
                        err
                    );
                    entry.outcome = ModOutcome::Failed;
                    return entry;
                }
            }
            Staleness::Missing => {}
        }

        let (attempts, present) = self.fetch_until_present(&entry.descriptor, &path);
        entry.fetch_attempts = attempts;
        entry.outcome = if present {
            ModOutcome::Updated
        } else {
            warn!(
                "!! Updating {} failed after {} tries !!",
                entry.descriptor, attempts
            );
            ModOutcome::Failed
        };
        entry
    }

    /// Invoke the fetcher until `path` is a directory or the budget runs out.
    ///
    /// Returns the number of attempts made and whether the directory exists.
    fn fetch_until_present(&self, descriptor: &ModDescriptor, path: &Path) -> (u32, bool) {
        let target = FetchTarget::workshop_mod(&self.layout.workshop_app_id, &descriptor.id);

        for attempt in 1..=self.policy.max_attempts {
            info!("Updating {} | {}", descriptor, attempt);
            if let Err(err) = self.fetcher.fetch(&target) {
                debug!(attempt, "fetch of {} reported failure: {:#}", descriptor, err);
            }

            if path.is_dir() {
                return (attempt, true);
            }
            if attempt < self.policy.max_attempts {
                std::thread::sleep(self.policy.retry_interval);
            }
        }

        (self.policy.max_attempts, false)
    }
}
