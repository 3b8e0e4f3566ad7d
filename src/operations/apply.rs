//! `aipaca apply`: replace a repository's AI files with a profile.

use crate::core::config::Config;
use crate::core::error::{AipacaError, Result};
use crate::core::fsutil;
use crate::core::output;
use crate::core::pathset;
use crate::core::store::Store;
use crate::operations::{backups, discover, profiles, resolve_repo_path};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub profile_name: String,
    pub repo_path: Option<PathBuf>,
    pub dry_run: bool,
    pub no_backup: bool,
    /// Allow applying a profile with no files.
    pub force: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    pub profile_name: String,
    pub repo_path: PathBuf,
    pub backup_name: Option<String>,
    /// Every file in the profile.
    pub files_applied: Vec<String>,
    /// Top-level AI entries that were in the repository beforehand.
    pub files_removed: Vec<String>,
    /// Profile files the configured patterns do not match. They are still
    /// copied, but later `diff`, `clean` and `save` will not see them.
    pub unmanaged: Vec<String>,
}

pub fn apply(cfg: &Config, store: &Store, opts: &ApplyOptions) -> Result<ApplyResult> {
    let repo = resolve_repo_path(opts.repo_path.as_deref())?;
    let profile = profiles::get_profile(store, cfg, &opts.profile_name)?;

    let files_applied = profiles::profile_files(store, &profile.name)?;
    if files_applied.is_empty() && !opts.force {
        return Err(AipacaError::InvalidInput(format!(
            "profile '{}' is empty, applying it would only remove files (use --force)",
            profile.name
        )));
    }
    let unmanaged = files_applied
        .iter()
        .filter(|f| !pathset::matches_any(f, &cfg.ai_patterns))
        .cloned()
        .collect();

    let current = discover(cfg, store, &repo);
    let mut result = ApplyResult {
        profile_name: profile.name.clone(),
        repo_path: repo.clone(),
        backup_name: None,
        files_applied,
        files_removed: current.rel_paths(),
        unmanaged,
    };
    if opts.dry_run {
        return Ok(result);
    }

    if !opts.no_backup {
        result.backup_name = backups::create_backup(store, &repo, &current)?;
    }
    for (_, abs) in &current {
        fsutil::remove_path(abs)?;
    }
    profiles::apply_profile(store, &profile.name, &repo)?;
    store
        .state()
        .record_apply(&repo, &profile.name, result.backup_name.as_deref())?;

    info!(
        profile = %profile.name,
        repo = %repo.display(),
        removed = result.files_removed.len(),
        applied = result.files_applied.len(),
        "applied profile"
    );
    Ok(result)
}

#[derive(Args, Debug)]
pub struct ApplyCli {
    /// Profile to apply
    pub profile: String,
    /// Repository path (defaults to the current directory)
    pub repo: Option<PathBuf>,
    /// Show what would happen without making changes
    #[clap(long)]
    pub dry_run: bool,
    /// Skip creating a backup (dangerous)
    #[clap(long)]
    pub no_backup: bool,
    /// Apply even if the profile is empty
    #[clap(long)]
    pub force: bool,
}

pub fn run_apply_cli(cfg: &Config, store: &Store, cli: ApplyCli) -> Result<()> {
    let dry_run = cli.dry_run;
    let result = apply(
        cfg,
        store,
        &ApplyOptions {
            profile_name: cli.profile,
            repo_path: cli.repo,
            dry_run,
            no_backup: cli.no_backup,
            force: cli.force,
        },
    )?;

    if dry_run {
        println!("Dry run - no changes made");
        println!();
    }

    if !result.files_removed.is_empty() {
        if dry_run {
            println!("Would remove existing AI files:");
        } else {
            println!("Removed existing AI files:");
        }
        for f in &result.files_removed {
            output::print_info(&format!("- {}", f));
        }
        println!();
    }

    if !result.files_applied.is_empty() {
        if dry_run {
            println!("Would apply from profile '{}':", result.profile_name);
        } else {
            println!("Applied from profile '{}':", result.profile_name);
        }
        for f in &result.files_applied {
            output::print_info(&format!("+ {}", f));
        }
        println!();
    }

    if !result.unmanaged.is_empty() {
        output::print_warning(&format!(
            "{} not matched by ai_patterns (diff, save and clean will ignore them):",
            output::plural(result.unmanaged.len(), "file is", "files are")
        ));
        for f in &result.unmanaged {
            output::print_info(f);
        }
        println!();
    }

    if !dry_run {
        if let Some(backup) = &result.backup_name {
            output::print_success(&format!("Created backup: {}", backup));
        }
        output::print_success(&format!("Applied profile '{}'", result.profile_name));
    }
    Ok(())
}
