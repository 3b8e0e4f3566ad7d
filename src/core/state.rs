//! Per-repository state: which profile is applied and which backup holds
//! the files it replaced.
//!
//! All repositories share one YAML record (`state/repo-states.yaml`) keyed
//! by absolute repository path. Every `set` rewrites the whole record via a
//! temp file and rename. Records for repositories that no longer exist are
//! kept and ignored.

use crate::core::error::{AipacaError, Result};
use crate::core::fsutil;
use crate::core::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const STATE_FILE_NAME: &str = "repo-states.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
    /// Backup name (not a filesystem path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
}

impl RepoState {
    pub fn is_empty(&self) -> bool {
        self.applied_profile.is_none() && self.applied_at.is_none() && self.backup_path.is_none()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    repos: BTreeMap<String, RepoState>,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(state_dir: &Path) -> Self {
        StateStore {
            path: state_dir.join(STATE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, repo: &Path) -> Result<Option<RepoState>> {
        let key = repo_key(repo)?;
        Ok(self.load()?.repos.remove(&key))
    }

    /// `None` (or an all-empty state) removes the entry.
    pub fn set(&self, repo: &Path, state: Option<RepoState>) -> Result<()> {
        let key = repo_key(repo)?;
        let mut file = self.load()?;
        match state {
            Some(state) if !state.is_empty() => {
                file.repos.insert(key, state);
            }
            _ => {
                file.repos.remove(&key);
            }
        }
        self.save(&file)
    }

    pub fn clear(&self, repo: &Path) -> Result<()> {
        self.set(repo, None)
    }

    pub fn record_apply(&self, repo: &Path, profile: &str, backup: Option<&str>) -> Result<()> {
        self.set(
            repo,
            Some(RepoState {
                applied_profile: Some(profile.to_string()),
                applied_at: Some(time::now_utc()),
                backup_path: backup.map(str::to_string),
            }),
        )
    }

    pub fn applied_profile(&self, repo: &Path) -> Result<Option<String>> {
        Ok(self.get(repo)?.and_then(|s| s.applied_profile))
    }

    pub fn backup_for(&self, repo: &Path) -> Result<Option<String>> {
        Ok(self.get(repo)?.and_then(|s| s.backup_path))
    }

    pub fn all(&self) -> Result<BTreeMap<String, RepoState>> {
        Ok(self.load()?.repos)
    }

    fn load(&self) -> Result<StateFile> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StateFile::default()),
            Err(e) => {
                return Err(AipacaError::io(
                    format!("failed to read state file {}", self.path.display()),
                    e,
                ));
            }
        };
        if raw.trim().is_empty() {
            return Ok(StateFile::default());
        }
        serde_yaml::from_str(&raw).map_err(|e| {
            AipacaError::ConfigError(format!(
                "failed to parse state file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, file: &StateFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fsutil::ensure_dir(parent)?;
        }
        let body = serde_yaml::to_string(file)?;
        let tmp = self.path.with_extension("yaml.tmp");
        fs::write(&tmp, body)
            .map_err(|e| AipacaError::io(format!("failed to write {}", tmp.display()), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            AipacaError::io(format!("failed to replace {}", self.path.display()), e)
        })?;
        debug!(path = %self.path.display(), repos = file.repos.len(), "wrote repo state");
        Ok(())
    }
}

fn repo_key(repo: &Path) -> Result<String> {
    Ok(fsutil::absolutize(repo)?.to_string_lossy().to_string())
}
