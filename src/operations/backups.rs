//! Backup catalogue.
//!
//! Backups are named `<repo base name>-<YYYY-MM-DD-HHMMSS>`. When that name
//! is already taken (two backups of one repo within the same second) a
//! `.1`, `.2`, ... suffix is appended instead of merging into the older
//! snapshot.

use crate::core::checksum;
use crate::core::config::Config;
use crate::core::error::{AipacaError, Result};
use crate::core::fsutil;
use crate::core::output;
use crate::core::pathset::AiFileSet;
use crate::core::store::Store;
use crate::core::time;
use crate::core::tree;
use crate::operations::resolve_repo_path;
use chrono::{DateTime, Local, NaiveDateTime};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_KEEP: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backup {
    pub name: String,
    pub path: PathBuf,
    pub created_at: Option<NaiveDateTime>,
    pub file_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub kept: usize,
    pub deleted: Vec<String>,
    /// Backup name and the error that stopped its deletion.
    pub failed: Vec<(String, String)>,
}

fn describe(name: &str, path: PathBuf) -> Backup {
    Backup {
        name: name.to_string(),
        created_at: time::parse_backup_stamp(name),
        file_count: tree::count_files_or_warn(&path),
        path,
    }
}

fn repo_base_name(repo: &Path) -> String {
    repo.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "root".to_string())
}

/// First free backup name for `repo` at `at`.
pub fn backup_name_for(store: &Store, repo: &Path, at: DateTime<Local>) -> Result<String> {
    let base = format!("{}-{}", repo_base_name(repo), time::backup_stamp(at));
    let mut candidate = base.clone();
    let mut n = 0;
    while store.backup_path(&candidate)?.exists() {
        n += 1;
        candidate = format!("{}.{}", base, n);
    }
    Ok(candidate)
}

/// Snapshot `set` into a new backup. Returns `None` when there is nothing
/// to back up. A partially written backup is removed on failure.
pub fn create_backup(store: &Store, repo: &Path, set: &AiFileSet) -> Result<Option<String>> {
    if set.is_empty() {
        return Ok(None);
    }

    let name = backup_name_for(store, repo, Local::now())?;
    let path = store.backup_path(&name)?;
    fsutil::ensure_dir(&path)?;

    for (rel, abs) in set {
        if let Err(e) = fsutil::copy_path(abs, &path.join(rel)) {
            if let Err(cleanup) = fsutil::remove_path(&path) {
                warn!(backup = %name, error = %cleanup, "failed to remove partial backup");
            }
            return Err(e);
        }
    }

    info!(backup = %name, entries = set.len(), "created backup");
    Ok(Some(name))
}

/// All backups, newest first. Undated names sort last.
pub fn list_backups(store: &Store) -> Result<Vec<Backup>> {
    let dir = store.backups_dir();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(AipacaError::io(
                format!("failed to read backups directory {}", dir.display()),
                e,
            ));
        }
    };

    let mut backups = Vec::new();
    for entry in entries {
        let entry = entry.map_err(AipacaError::IoError)?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        backups.push(describe(&name, entry.path()));
    }
    backups.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.name.cmp(&a.name))
    });
    Ok(backups)
}

pub fn get_backup(store: &Store, name: &str) -> Result<Backup> {
    let path = store.backup_path(name)?;
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => Ok(describe(name, path)),
        Ok(_) => Err(AipacaError::InvalidInput(format!(
            "backup '{}' is not a directory",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AipacaError::NotFound(format!("backup '{}'", name)))
        }
        Err(e) => Err(AipacaError::io(format!("failed to access backup '{}'", name), e)),
    }
}

pub fn backup_files(store: &Store, name: &str) -> Result<Vec<String>> {
    tree::list_all_files(&get_backup(store, name)?.path)
}

pub fn delete_backup(store: &Store, name: &str) -> Result<()> {
    let path = store.backup_path(name)?;
    if !path.exists() {
        return Err(AipacaError::NotFound(format!("backup '{}'", name)));
    }
    fsutil::remove_path(&path)?;
    info!(backup = %name, "deleted backup");
    Ok(())
}

/// Backups taken from a repository with the same base name, newest first.
pub fn backups_for_repo(store: &Store, repo: &Path) -> Result<Vec<Backup>> {
    let base = repo_base_name(repo);
    Ok(list_backups(store)?
        .into_iter()
        .filter(|b| time::split_backup_name(&b.name).is_some_and(|(repo, _)| repo == base))
        .collect())
}

pub fn latest_backup_for_repo(store: &Store, repo: &Path) -> Result<Option<Backup>> {
    Ok(backups_for_repo(store, repo)?.into_iter().next())
}

/// Remove the current AI files from `repo` and copy the backup's contents
/// in their place.
pub fn restore_backup(
    store: &Store,
    name: &str,
    repo: &Path,
    current: &AiFileSet,
) -> Result<Vec<String>> {
    let backup = get_backup(store, name)?;
    for (_, abs) in current {
        fsutil::remove_path(abs)?;
    }
    let restored = fsutil::copy_contents(&backup.path, repo)?;
    info!(backup = %name, repo = %repo.display(), "restored backup");
    Ok(restored)
}

/// Delete all but the `keep` newest backups (optionally only one repo's).
/// A failed deletion is reported and does not stop the rest.
pub fn prune_backups(store: &Store, keep: usize, repo: Option<&Path>) -> Result<PruneReport> {
    let backups = match repo {
        Some(repo) => backups_for_repo(store, repo)?,
        None => list_backups(store)?,
    };

    let mut report = PruneReport {
        kept: backups.len().min(keep),
        ..PruneReport::default()
    };
    for backup in backups.into_iter().skip(keep) {
        match delete_backup(store, &backup.name) {
            Ok(()) => report.deleted.push(backup.name),
            Err(e) => report.failed.push((backup.name, e.to_string())),
        }
    }
    Ok(report)
}

#[derive(Args, Debug)]
pub struct BackupsCli {
    #[clap(subcommand)]
    pub command: BackupsCommand,
}

#[derive(Subcommand, Debug)]
pub enum BackupsCommand {
    /// List all backups
    List {
        /// Only backups taken from this repository
        #[clap(long)]
        repo: Option<PathBuf>,
    },
    /// Show backup contents
    Show {
        /// Backup name
        backup: String,
    },
    /// Delete a backup
    Delete {
        /// Backup name
        backup: String,
    },
    /// Delete old backups, keeping the most recent ones
    Prune {
        /// Number of recent backups to keep
        #[clap(long, default_value_t = DEFAULT_KEEP)]
        keep: usize,
        /// Only prune backups taken from this repository
        #[clap(long)]
        repo: Option<PathBuf>,
    },
}

fn created_label(backup: &Backup) -> String {
    backup
        .created_at
        .as_ref()
        .map(time::display_naive)
        .unwrap_or_else(|| "-".to_string())
}

pub fn run_backups_cli(_cfg: &Config, store: &Store, cli: BackupsCli) -> Result<()> {
    match cli.command {
        BackupsCommand::List { repo } => {
            let backups = match repo {
                Some(repo) => {
                    backups_for_repo(store, &resolve_repo_path(Some(repo.as_path()))?)?
                }
                None => list_backups(store)?,
            };
            if backups.is_empty() {
                println!("No backups found");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = backups
                .iter()
                .map(|b| vec![b.name.clone(), b.file_count.to_string(), created_label(b)])
                .collect();
            println!(
                "{}",
                output::render_table(&["BACKUP", "FILES", "CREATED"], &rows)
            );
        }
        BackupsCommand::Show { backup } => {
            let b = get_backup(store, &backup)?;
            println!("Backup: {}", b.name);
            if b.created_at.is_some() {
                println!("Created: {}", created_label(&b));
            }
            println!("Files: {}", b.file_count);
            println!("Checksum: {}", checksum::dir_checksum(&b.path)?);
            println!();
            println!("Contents:");
            for f in backup_files(store, &backup)? {
                output::print_info(&f);
            }
        }
        BackupsCommand::Delete { backup } => {
            get_backup(store, &backup)?;
            delete_backup(store, &backup)?;
            output::print_success(&format!("Deleted backup '{}'", backup));
        }
        BackupsCommand::Prune { keep, repo } => {
            let repo = match repo {
                Some(repo) => Some(resolve_repo_path(Some(repo.as_path()))?),
                None => None,
            };
            let report = prune_backups(store, keep, repo.as_deref())?;
            if report.deleted.is_empty() && report.failed.is_empty() {
                println!(
                    "Nothing to prune (have {}, keeping {})",
                    output::plural(report.kept, "backup", "backups"),
                    keep
                );
                return Ok(());
            }
            for name in &report.deleted {
                output::print_info(&format!("Deleted: {}", name));
            }
            for (name, err) in &report.failed {
                output::print_warning(&format!("Failed to delete '{}': {}", name, err));
            }
            if !report.deleted.is_empty() {
                output::print_success(&format!(
                    "Pruned {} old backup(s), kept {} most recent",
                    report.deleted.len(),
                    report.kept
                ));
            }
        }
    }
    Ok(())
}
