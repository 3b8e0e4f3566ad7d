//! `aipaca save`: capture a repository's AI files into a profile.

use crate::core::config::Config;
use crate::core::error::{AipacaError, Result};
use crate::core::output;
use crate::core::store::{self, Store};
use crate::operations::{discover, profiles, resolve_repo_path};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Existing (or new) profile to update. Falls back to the applied one.
    pub profile_name: Option<String>,
    /// Save under a new name; refuses to overwrite unless `force`.
    pub as_name: Option<String>,
    pub repo_path: Option<PathBuf>,
    pub dry_run: bool,
    pub force: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveResult {
    pub profile_name: String,
    pub files_saved: Vec<String>,
    pub is_new: bool,
}

pub fn save(cfg: &Config, store: &Store, opts: &SaveOptions) -> Result<SaveResult> {
    let repo = resolve_repo_path(opts.repo_path.as_deref())?;

    let (target, is_new) = match (&opts.as_name, &opts.profile_name) {
        (Some(name), _) => {
            store::validate_name("profile", name)?;
            if store.profile_exists(name) && !opts.force {
                return Err(AipacaError::AlreadyExists(format!(
                    "profile '{}' (use --force to overwrite)",
                    name
                )));
            }
            (name.clone(), !store.profile_exists(name))
        }
        (None, Some(name)) => {
            store::validate_name("profile", name)?;
            (name.clone(), !store.profile_exists(name))
        }
        (None, None) => match store.state().applied_profile(&repo)? {
            Some(name) => {
                let is_new = !store.profile_exists(&name);
                (name, is_new)
            }
            None => {
                return Err(AipacaError::InvalidInput(
                    "no profile specified and none applied to this repository (use --as <name>)"
                        .to_string(),
                ));
            }
        },
    };

    let set = discover(cfg, store, &repo);
    if set.is_empty() {
        return Err(AipacaError::InvalidInput(format!(
            "no AI files found in {}",
            repo.display()
        )));
    }

    let result = SaveResult {
        profile_name: target,
        files_saved: set.rel_paths(),
        is_new,
    };
    if opts.dry_run {
        return Ok(result);
    }

    profiles::save_to_profile(store, &result.profile_name, &set)?;
    Ok(result)
}

#[derive(Args, Debug)]
pub struct SaveCli {
    /// Profile to update (defaults to the applied profile)
    pub profile: Option<String>,
    /// Repository path (defaults to the current directory)
    pub repo: Option<PathBuf>,
    /// Save as a new profile with this name
    #[clap(long = "as", value_name = "NAME")]
    pub as_name: Option<String>,
    /// Show what would happen without making changes
    #[clap(long)]
    pub dry_run: bool,
    /// Overwrite an existing profile named by --as
    #[clap(long)]
    pub force: bool,
}

pub fn run_save_cli(cfg: &Config, store: &Store, cli: SaveCli) -> Result<()> {
    let dry_run = cli.dry_run;
    let result = save(
        cfg,
        store,
        &SaveOptions {
            profile_name: cli.profile,
            as_name: cli.as_name,
            repo_path: cli.repo,
            dry_run,
            force: cli.force,
        },
    )?;

    if dry_run {
        println!("Dry run - no changes made");
        println!();
    }

    let action = match (dry_run, result.is_new) {
        (true, _) => "Would save",
        (false, true) => "Created new profile",
        (false, false) => "Updated profile",
    };
    println!(
        "{} '{}' with {}:",
        action,
        result.profile_name,
        output::plural(result.files_saved.len(), "entry", "entries")
    );
    for f in &result.files_saved {
        output::print_info(f);
    }

    if !dry_run {
        println!();
        if result.is_new {
            output::print_success(&format!("Created new profile '{}'", result.profile_name));
        } else {
            output::print_success(&format!("Updated profile '{}'", result.profile_name));
        }
    }
    Ok(())
}
