//! Staleness checks against the workshop changelog.
//!
//! The newest changelog announcement carries the Unix timestamp of the last
//! update in `<p id="...">`. Installed content is stale when that timestamp is
//! not older than the local directory's creation time. Every ambiguity
//! (unreachable changelog, missing marker, unreadable local timestamp) is
//! resolved as fresh so that a format change never deletes installed mods.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

static UPDATED_AT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)workshopAnnouncement.*?<p id="(\d+)">"#)
        .expect("changelog pattern is a valid regex")
});

/// Source of raw changelog pages, one per mod id.
pub trait ChangelogSource {
    fn changelog(&self, mod_id: &str) -> anyhow::Result<String>;
}

impl<T: ChangelogSource + ?Sized> ChangelogSource for &T {
    fn changelog(&self, mod_id: &str) -> anyhow::Result<String> {
        (**self).changelog(mod_id)
    }
}

impl<T: ChangelogSource + ?Sized> ChangelogSource for Box<T> {
    fn changelog(&self, mod_id: &str) -> anyhow::Result<String> {
        (**self).changelog(mod_id)
    }
}

/// Fetches changelog pages over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChangelogSource {
    base_url: Url,
    timeout: Duration,
}

/// Upper bound for one changelog request, connect through body.
pub const DEFAULT_CHANGELOG_TIMEOUT: Duration = Duration::from_secs(30);

impl HttpChangelogSource {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid changelog URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Changelog URL cannot be used as a base: {}", base_url);
        }
        Ok(Self {
            base_url,
            timeout: DEFAULT_CHANGELOG_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `<base>/<mod_id>`
    pub fn changelog_url(&self, mod_id: &str) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Changelog URL cannot be used as a base: {}", self.base_url))?
            .pop_if_empty()
            .push(mod_id);
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> anyhow::Result<String> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("modsync/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let response = client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch changelog from {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch changelog: HTTP {} from {}",
                response.status(),
                url
            );
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read changelog body from {}", url))
    }
}

impl ChangelogSource for HttpChangelogSource {
    fn changelog(&self, mod_id: &str) -> anyhow::Result<String> {
        let url = self.changelog_url(mod_id)?;
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;
        runtime.block_on(self.fetch(url))
    }
}

/// Verdict for one installed mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// No local directory; nothing to compare.
    Missing,
    /// Installed and not older than the remote revision (or undecidable).
    Fresh,
    /// Installed and older than the remote revision.
    Stale,
}

#[derive(Debug)]
pub struct StalenessOracle<S> {
    source: S,
}

impl<S: ChangelogSource> StalenessOracle<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Compare the remote changelog of `mod_id` with the content at `local_path`.
    ///
    /// Performs one changelog read when `local_path` is a directory and none
    /// otherwise.
    pub fn check(&self, mod_id: &str, local_path: &Path) -> Staleness {
        if !local_path.is_dir() {
            return Staleness::Missing;
        }

        let body = match self.source.changelog(mod_id) {
            Ok(body) => body,
            Err(err) => {
                warn!(mod_id, "changelog unavailable, treating as fresh: {err:#}");
                return Staleness::Fresh;
            }
        };

        let Some(remote_updated_at) = parse_remote_updated_at(&body) else {
            debug!(mod_id, "no update marker in changelog, treating as fresh");
            return Staleness::Fresh;
        };
        let Some(local_created_at) = local_created_at(local_path) else {
            warn!(
                mod_id,
                path = %local_path.display(),
                "local creation time unavailable, treating as fresh"
            );
            return Staleness::Fresh;
        };

        debug!(
            mod_id,
            %remote_updated_at,
            %local_created_at,
            "compared changelog with local content"
        );
        if is_outdated(remote_updated_at, local_created_at) {
            Staleness::Stale
        } else {
            Staleness::Fresh
        }
    }

    pub fn is_stale(&self, mod_id: &str, local_path: &Path) -> bool {
        self.check(mod_id, local_path) == Staleness::Stale
    }
}

/// Extract the last-update timestamp from a changelog page.
pub fn parse_remote_updated_at(body: &str) -> Option<DateTime<Utc>> {
    let captures = UPDATED_AT_PATTERN.captures(body)?;
    let seconds: i64 = captures.get(1)?.as_str().parse().ok()?;
    DateTime::from_timestamp(seconds, 0)
}

/// Creation time of a local content directory.
///
/// Uses the inode change time on Unix, which is when the fetch tool created
/// the directory for content that is never modified in place.
pub fn local_created_at(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = std::fs::metadata(path).ok()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        DateTime::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32)
    }

    #[cfg(not(unix))]
    {
        metadata.created().ok().map(DateTime::<Utc>::from)
    }
}

/// Stale when the remote update is at or after the local creation.
pub fn is_outdated(remote_updated_at: DateTime<Utc>, local_created_at: DateTime<Utc>) -> bool {
    remote_updated_at >= local_created_at
}
