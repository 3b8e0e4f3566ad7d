//! `aipaca status`: applied profile, drift since apply, current AI entries
//! and available backups for one repository.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::output::{self, OutputFormat};
use crate::core::state::RepoState;
use crate::core::store::Store;
use crate::core::time;
use crate::core::tree;
use crate::operations::backups::{self, Backup};
use crate::operations::diff::{self, DiffResult};
use crate::operations::{discover, resolve_repo_path};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backups listed in text output before collapsing into "... and N more".
const SHOWN_BACKUPS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub path: String,
    pub is_dir: bool,
    /// Files beneath a directory entry; 1 for a file.
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub repo_path: PathBuf,
    pub state: Option<RepoState>,
    pub diff: Option<DiffResult>,
    /// Why the diff against the applied profile could not be computed.
    pub diff_error: Option<String>,
    pub entries: Vec<StatusEntry>,
    pub backups: Vec<Backup>,
}

pub fn status(cfg: &Config, store: &Store, repo_path: Option<&Path>) -> Result<StatusReport> {
    let repo = resolve_repo_path(repo_path)?;
    let state = store.state().get(&repo)?;

    let (diff, diff_error) = match state.as_ref().and_then(|s| s.applied_profile.as_deref()) {
        Some(profile) => match diff::diff_against(cfg, store, &repo, profile) {
            Ok(result) => (Some(result), None),
            Err(e) => {
                debug!(profile = %profile, error = %e, "status diff failed");
                (None, Some(e.to_string()))
            }
        },
        None => (None, None),
    };

    let entries = discover(cfg, store, &repo)
        .iter()
        .map(|(rel, abs)| {
            let is_dir = abs.is_dir();
            StatusEntry {
                path: rel.clone(),
                is_dir,
                file_count: if is_dir {
                    tree::count_files_or_warn(abs)
                } else {
                    1
                },
            }
        })
        .collect();

    Ok(StatusReport {
        backups: backups::backups_for_repo(store, &repo)?,
        repo_path: repo,
        state,
        diff,
        diff_error,
        entries,
    })
}

#[derive(Args, Debug)]
pub struct StatusCli {
    /// Repository path (defaults to the current directory)
    pub repo: Option<PathBuf>,
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run_status_cli(cfg: &Config, store: &Store, cli: StatusCli) -> Result<()> {
    let report = status(cfg, store, cli.repo.as_deref())?;
    if cli.format == OutputFormat::Json {
        return output::print_json(&report);
    }

    println!("Repo: {}", report.repo_path.display());
    println!();

    let applied = report
        .state
        .as_ref()
        .and_then(|s| s.applied_profile.as_deref().map(|p| (s, p)));
    match applied {
        Some((state, profile)) => {
            let marker = match (&report.diff, &report.diff_error) {
                (Some(d), _) if d.has_changes() => format!(" {}", "(modified)".yellow()),
                (None, Some(_)) => format!(" {}", "(unknown)".yellow()),
                _ => String::new(),
            };
            println!("Applied profile: {}{}", profile.cyan(), marker);
            if let Some(at) = &state.applied_at {
                println!("Applied at: {}", time::display_utc(at));
            }
            if let Some(backup) = &state.backup_path {
                println!("Backup: {}", backup);
            }
            println!();

            if let Some(err) = &report.diff_error {
                output::print_warning(&format!("Could not compare against '{}': {}", profile, err));
                println!();
            }
            if let Some(d) = report.diff.as_ref().filter(|d| d.has_changes()) {
                println!("Changes since apply:");
                for change in &d.report.changes {
                    println!("  {} {}", output::change_marker(change.kind), change.path);
                }
                println!();
            }
        }
        None => {
            println!("No profile currently applied");
            if let Some(backup) = report.state.as_ref().and_then(|s| s.backup_path.as_deref()) {
                println!("Backup: {}", backup);
            }
            println!();
        }
    }

    if report.entries.is_empty() {
        println!("No AI files in repo");
    } else {
        println!("AI files in repo:");
        for entry in &report.entries {
            if entry.is_dir {
                output::print_info(&format!(
                    "{}/ ({})",
                    entry.path,
                    output::plural(entry.file_count, "file", "files")
                ));
            } else {
                output::print_info(&entry.path);
            }
        }
    }

    if !report.backups.is_empty() {
        println!();
        println!("Available backups ({}):", report.backups.len());
        for backup in report.backups.iter().take(SHOWN_BACKUPS) {
            output::print_info(&format!(
                "{} ({})",
                backup.name,
                output::plural(backup.file_count, "file", "files")
            ));
        }
        if report.backups.len() > SHOWN_BACKUPS {
            output::print_info(&format!(
                "... and {} more",
                report.backups.len() - SHOWN_BACKUPS
            ));
        }
    }
    Ok(())
}
