//! Storage root layout.
//!
//! ```text
//! <root>/
//!   profiles/<name>/...          reusable bundles, mirroring a repo's AI files
//!   backups/<repo>-<stamp>/...   snapshots taken before destructive steps
//!   state/repo-states.yaml       per-repository applied profile and backup
//! ```
//!
//! A `Store` is built once per invocation from the config and handed to
//! every operation.

use crate::core::config::Config;
use crate::core::error::{AipacaError, Result};
use crate::core::fsutil;
use crate::core::state::StateStore;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid name regex"));

#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute path to the storage root
    pub root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Store { root: root.into() }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Store::new(cfg.storage_path())
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    pub fn state(&self) -> StateStore {
        StateStore::new(&self.state_dir())
    }

    pub fn profile_path(&self, name: &str) -> Result<PathBuf> {
        validate_name("profile", name)?;
        Ok(self.profiles_dir().join(name))
    }

    pub fn backup_path(&self, name: &str) -> Result<PathBuf> {
        validate_name("backup", name)?;
        Ok(self.backups_dir().join(name))
    }

    pub fn profile_exists(&self, name: &str) -> bool {
        self.profile_path(name).is_ok_and(|p| p.is_dir())
    }

    pub fn backup_exists(&self, name: &str) -> bool {
        self.backup_path(name).is_ok_and(|p| p.is_dir())
    }

    /// Create the root and its three subdirectories. Idempotent.
    pub fn init(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.profiles_dir(),
            self.backups_dir(),
            self.state_dir(),
        ] {
            fsutil::ensure_dir(&dir)?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        [
            self.root.clone(),
            self.profiles_dir(),
            self.backups_dir(),
            self.state_dir(),
        ]
        .iter()
        .all(|d| d.is_dir())
    }
}

/// Profile and backup names are single path components, so they can never
/// point outside the storage root.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name == "." || name == ".." || !NAME_RE.is_match(name) {
        return Err(AipacaError::InvalidInput(format!(
            "invalid {} name '{}': use letters, digits, '.', '_' or '-'",
            kind, name
        )));
    }
    Ok(())
}

pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}
