//! Shared fixtures: a temp server layout plus stub fetcher and changelog.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::TempDir;

use modsync_core::config::{ModsLayout, ModsyncConfig, ServerConfig};
use modsync_core::fetch::{ContentFetcher, FetchTarget};
use modsync_core::staleness::ChangelogSource;

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub layout: ModsLayout,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let server_dir = root.join("server");
        let layout = ModsLayout {
            workshop_app_id: "107410".to_string(),
            workshop_dir: root.join("workshop"),
            mods_dir: server_dir.clone(),
            keys_dir: server_dir.join("keys"),
            mods_list_dir: root.join("lists"),
            default_mods_list: "arga".to_string(),
            key_extensions: vec!["bikey".to_string()],
        };
        fs::create_dir_all(&layout.workshop_dir).expect("create workshop dir");
        fs::create_dir_all(&server_dir).expect("create server dir");
        fs::create_dir_all(&layout.mods_list_dir).expect("create lists dir");

        Self {
            _tmp: tmp,
            root,
            layout,
        }
    }

    /// Default config with the Arma 3 server pointed at this environment.
    pub fn config(&self) -> ModsyncConfig {
        ModsyncConfig {
            arma3: ServerConfig {
                app_id: "233780".to_string(),
                server_dir: self.layout.mods_dir.clone(),
                mods: Some(self.layout.clone()),
            },
            ..ModsyncConfig::default()
        }
    }

    pub fn write_mods_list(&self, name: &str, mods: &[(&str, &str)]) {
        let map: serde_json::Map<String, serde_json::Value> = mods
            .iter()
            .map(|(n, id)| (n.to_string(), serde_json::Value::String(id.to_string())))
            .collect();
        fs::write(
            self.layout.mods_list_path(name),
            serde_json::to_string_pretty(&map).expect("serialize mods list"),
        )
        .expect("write mods list");
    }

    pub fn content_path(&self, id: &str) -> PathBuf {
        self.layout.content_path(id)
    }

    /// Install mod content the way the fetch tool lands it.
    pub fn install_mod(&self, id: &str) -> PathBuf {
        install_content(&self.content_path(id), id)
    }
}

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
    }
    fs::write(path, content).expect("write should succeed in test temp dirs");
}

/// Typical workshop item: mixed-case addon folder plus a signing key.
pub fn install_content(dir: &Path, id: &str) -> PathBuf {
    write_file(&dir.join("Addons").join("Mod_Main.PBO"), b"pbo");
    write_file(&dir.join("Keys").join(format!("mod_{id}.bikey")), id.as_bytes());
    dir.to_path_buf()
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs() as i64
}

/// Changelog page whose newest announcement has timestamp `ts`.
pub fn changelog_page(ts: i64) -> String {
    format!(
        r#"<div class="workshopAnnouncement"><div class="headline">Update</div><p id="{ts}">Changes</p></div>"#
    )
}

/// How the stub fetcher behaves for one mod id.
#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    /// Never produces the directory; reports an error like a timed-out download.
    Never,
    /// Produces the directory on the given (1-based) attempt.
    SucceedOnAttempt(u32),
}

/// Fetcher that lands content in the workshop dir according to per-mod behaviour.
#[derive(Clone)]
pub struct StubFetcher {
    workshop_dir: PathBuf,
    behaviour: HashMap<String, Behaviour>,
    calls: Rc<RefCell<Vec<FetchTarget>>>,
    server_fails: bool,
}

impl StubFetcher {
    pub fn new(layout: &ModsLayout) -> Self {
        Self {
            workshop_dir: layout.workshop_dir.clone(),
            behaviour: HashMap::new(),
            calls: Rc::new(RefCell::new(Vec::new())),
            server_fails: false,
        }
    }

    pub fn with(mut self, id: &str, behaviour: Behaviour) -> Self {
        self.behaviour.insert(id.to_string(), behaviour);
        self
    }

    pub fn failing_server(mut self) -> Self {
        self.server_fails = true;
        self
    }

    /// Handle to the recorded calls, usable after the fetcher is boxed.
    pub fn calls(&self) -> Rc<RefCell<Vec<FetchTarget>>> {
        Rc::clone(&self.calls)
    }

    pub fn attempts_for(calls: &Rc<RefCell<Vec<FetchTarget>>>, id: &str) -> usize {
        calls
            .borrow()
            .iter()
            .filter(|t| matches!(t, FetchTarget::Mod { mod_id, .. } if mod_id == id))
            .count()
    }
}

impl ContentFetcher for StubFetcher {
    fn fetch(&self, target: &FetchTarget) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(target.clone());
        match target {
            FetchTarget::Server { .. } => {
                if self.server_fails {
                    anyhow::bail!("steamcmd exited with exit status: 8");
                }
                Ok(())
            }
            FetchTarget::Mod { mod_id, .. } => {
                let attempt = Self::attempts_for(&self.calls, mod_id) as u32;
                match self
                    .behaviour
                    .get(mod_id)
                    .copied()
                    .unwrap_or(Behaviour::SucceedOnAttempt(1))
                {
                    Behaviour::Never => anyhow::bail!("Timeout downloading item {}", mod_id),
                    Behaviour::SucceedOnAttempt(n) if attempt >= n => {
                        install_content(&self.workshop_dir.join(mod_id), mod_id);
                        Ok(())
                    }
                    Behaviour::SucceedOnAttempt(_) => {
                        anyhow::bail!("Timeout downloading item {}", mod_id)
                    }
                }
            }
        }
    }
}

/// Changelog source serving the same page for every mod, counting reads.
#[derive(Clone)]
pub struct StubChangelog {
    page: Option<String>,
    reads: Rc<RefCell<Vec<String>>>,
}

impl StubChangelog {
    pub fn page(page: impl Into<String>) -> Self {
        Self {
            page: Some(page.into()),
            reads: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Changelog that cannot be reached.
    pub fn unreachable() -> Self {
        Self {
            page: None,
            reads: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn reads(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.reads)
    }
}

impl ChangelogSource for StubChangelog {
    fn changelog(&self, mod_id: &str) -> anyhow::Result<String> {
        self.reads.borrow_mut().push(mod_id.to_string());
        self.page
            .clone()
            .ok_or_else(|| anyhow::anyhow!("HTTP 503 from changelog for {}", mod_id))
    }
}
