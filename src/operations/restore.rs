//! `aipaca restore`: bring back the AI files a repository had before the
//! last apply or clean.

use crate::core::config::Config;
use crate::core::error::{AipacaError, Result};
use crate::core::output;
use crate::core::store::Store;
use crate::operations::{backups, discover, resolve_repo_path};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    pub repo_path: Option<PathBuf>,
    /// Explicit backup; defaults to the one recorded for the repository.
    pub backup_name: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreResult {
    pub backup_name: String,
    pub files_restored: Vec<String>,
    pub files_removed: Vec<String>,
    pub previous_profile: Option<String>,
}

pub fn restore(cfg: &Config, store: &Store, opts: &RestoreOptions) -> Result<RestoreResult> {
    let repo = resolve_repo_path(opts.repo_path.as_deref())?;
    let states = store.state();
    let state = states.get(&repo)?.unwrap_or_default();

    let backup_name = match opts.backup_name.clone().or(state.backup_path) {
        Some(name) => name,
        None => {
            let hint = match backups::latest_backup_for_repo(store, &repo)? {
                Some(latest) => format!(" (try --backup {})", latest.name),
                None => String::new(),
            };
            return Err(AipacaError::InvalidInput(format!(
                "no backup found for this repository{}",
                hint
            )));
        }
    };
    let files_restored = backups::backup_files(store, &backup_name)?;

    let current = discover(cfg, store, &repo);
    let result = RestoreResult {
        backup_name,
        files_restored,
        files_removed: current.rel_paths(),
        previous_profile: state.applied_profile,
    };
    if opts.dry_run {
        return Ok(result);
    }

    backups::restore_backup(store, &result.backup_name, &repo, &current)?;
    states.clear(&repo)?;
    Ok(result)
}

#[derive(Args, Debug)]
pub struct RestoreCli {
    /// Repository path (defaults to the current directory)
    pub repo: Option<PathBuf>,
    /// Restore from a specific backup
    #[clap(long, value_name = "NAME")]
    pub backup: Option<String>,
    /// Show what would happen without making changes
    #[clap(long)]
    pub dry_run: bool,
}

pub fn run_restore_cli(cfg: &Config, store: &Store, cli: RestoreCli) -> Result<()> {
    let dry_run = cli.dry_run;
    let result = restore(
        cfg,
        store,
        &RestoreOptions {
            repo_path: cli.repo,
            backup_name: cli.backup,
            dry_run,
        },
    )?;

    if dry_run {
        println!("Dry run - no changes made");
        println!();
    }

    if !result.files_removed.is_empty() {
        if dry_run {
            println!("Would remove current AI files:");
        } else {
            println!("Removed current AI files:");
        }
        for f in &result.files_removed {
            output::print_info(&format!("- {}", f));
        }
        println!();
    }

    if !result.files_restored.is_empty() {
        if dry_run {
            println!("Would restore from backup '{}':", result.backup_name);
        } else {
            println!("Restored from backup '{}':", result.backup_name);
        }
        for f in &result.files_restored {
            output::print_info(&format!("+ {}", f));
        }
        println!();
    }

    if !dry_run {
        output::print_success("Restored original AI files");
        if let Some(profile) = &result.previous_profile {
            output::print_info(&format!(
                "Previously applied profile '{}' has been cleared",
                profile
            ));
        }
    }
    Ok(())
}
