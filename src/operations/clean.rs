//! `aipaca clean`: remove every AI file from a repository, keeping a backup.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::fsutil;
use crate::core::output;
use crate::core::state::RepoState;
use crate::core::store::Store;
use crate::operations::{backups, discover, resolve_repo_path};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub repo_path: Option<PathBuf>,
    pub dry_run: bool,
    pub no_backup: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanResult {
    pub backup_name: Option<String>,
    pub files_removed: Vec<String>,
}

pub fn clean(cfg: &Config, store: &Store, opts: &CleanOptions) -> Result<CleanResult> {
    let repo = resolve_repo_path(opts.repo_path.as_deref())?;
    let set = discover(cfg, store, &repo);

    let mut result = CleanResult {
        backup_name: None,
        files_removed: set.rel_paths(),
    };
    if set.is_empty() || opts.dry_run {
        return Ok(result);
    }

    let states = store.state();
    if opts.no_backup {
        // The repo no longer carries the applied profile, but an earlier
        // backup is still the way back.
        let kept = states.backup_for(&repo)?;
        states.set(
            &repo,
            Some(RepoState {
                backup_path: kept,
                ..RepoState::default()
            }),
        )?;
    } else {
        result.backup_name = backups::create_backup(store, &repo, &set)?;
        states.set(
            &repo,
            Some(RepoState {
                backup_path: result.backup_name.clone(),
                ..RepoState::default()
            }),
        )?;
    }

    for (_, abs) in &set {
        fsutil::remove_path(abs)?;
    }
    info!(repo = %repo.display(), removed = set.len(), "cleaned repository");
    Ok(result)
}

#[derive(Args, Debug)]
pub struct CleanCli {
    /// Repository path (defaults to the current directory)
    pub repo: Option<PathBuf>,
    /// Show what would happen without making changes
    #[clap(long)]
    pub dry_run: bool,
    /// Skip creating a backup (dangerous)
    #[clap(long)]
    pub no_backup: bool,
}

pub fn run_clean_cli(cfg: &Config, store: &Store, cli: CleanCli) -> Result<()> {
    let dry_run = cli.dry_run;
    let result = clean(
        cfg,
        store,
        &CleanOptions {
            repo_path: cli.repo,
            dry_run,
            no_backup: cli.no_backup,
        },
    )?;

    if result.files_removed.is_empty() {
        println!("No AI files found in repository");
        return Ok(());
    }

    if dry_run {
        println!("Dry run - no changes made");
        println!();
        println!("Would remove:");
    } else {
        println!("Removed:");
    }
    for f in &result.files_removed {
        output::print_info(&format!("- {}", f));
    }

    if !dry_run {
        println!();
        if let Some(backup) = &result.backup_name {
            output::print_success(&format!("Created backup: {}", backup));
        }
        output::print_success(&format!(
            "Cleaned {}",
            output::plural(
                result.files_removed.len(),
                "AI file/directory",
                "AI files/directories"
            )
        ));
        println!();
        println!("Run 'aipaca restore' to bring them back 🦙");
    }
    Ok(())
}
