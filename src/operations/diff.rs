//! `aipaca diff`: compare a repository's AI files against a profile.

use crate::core::config::Config;
use crate::core::error::{AipacaError, Result};
use crate::core::output::{self, OutputFormat};
use crate::core::reconcile::{self, ByteComparator, ChangeKind, DiffReport};
use crate::core::store::Store;
use crate::operations::{discover, profiles, resolve_repo_path};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Defaults to the profile applied to the repository.
    pub profile_name: Option<String>,
    pub repo_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub profile_name: String,
    #[serde(flatten)]
    pub report: DiffReport,
}

impl DiffResult {
    pub fn has_changes(&self) -> bool {
        self.report.has_changes()
    }
}

pub fn diff(cfg: &Config, store: &Store, opts: &DiffOptions) -> Result<DiffResult> {
    let repo = resolve_repo_path(opts.repo_path.as_deref())?;
    let profile_name = match &opts.profile_name {
        Some(name) => name.clone(),
        None => store.state().applied_profile(&repo)?.ok_or_else(|| {
            AipacaError::InvalidInput(
                "no profile specified and none applied to this repository".to_string(),
            )
        })?,
    };
    diff_against(cfg, store, &repo, &profile_name)
}

/// Diff an already-resolved repository against a named profile.
pub(crate) fn diff_against(
    cfg: &Config,
    store: &Store,
    repo: &Path,
    profile_name: &str,
) -> Result<DiffResult> {
    let profile = profiles::get_profile(store, cfg, profile_name)?;
    let repo_tree = reconcile::flatten(&discover(cfg, store, repo))?;
    let profile_tree = reconcile::reference_tree(&profile.path)?;
    Ok(DiffResult {
        profile_name: profile.name,
        report: reconcile::reconcile(&repo_tree, &profile_tree, &ByteComparator),
    })
}

#[derive(Args, Debug)]
pub struct DiffCli {
    /// Profile to compare against (defaults to the applied profile)
    pub profile: Option<String>,
    /// Repository path (defaults to the current directory)
    pub repo: Option<PathBuf>,
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run_diff_cli(cfg: &Config, store: &Store, cli: DiffCli) -> Result<()> {
    let result = diff(
        cfg,
        store,
        &DiffOptions {
            profile_name: cli.profile,
            repo_path: cli.repo,
        },
    )?;

    if cli.format == OutputFormat::Json {
        return output::print_json(&result);
    }

    println!("Comparing against profile '{}'", result.profile_name.cyan());
    println!();
    if result.has_changes() {
        println!("Changes:");
        for change in &result.report.changes {
            let note = match change.kind {
                ChangeKind::Added => "added in repo",
                ChangeKind::Removed => "missing from repo",
                ChangeKind::Modified => "modified",
            };
            println!(
                "  {} {} ({})",
                output::change_marker(change.kind),
                change.path,
                note
            );
        }
        println!();
        println!(
            "{} added, {} removed, {} modified",
            result.report.count(ChangeKind::Added),
            result.report.count(ChangeKind::Removed),
            result.report.count(ChangeKind::Modified)
        );
    } else {
        println!("No differences found");
    }

    if !result.report.undetermined.is_empty() {
        println!();
        output::print_warning(&format!(
            "Could not compare {}:",
            output::plural(result.report.undetermined.len(), "file", "files")
        ));
        for path in &result.report.undetermined {
            output::print_info(path);
        }
    }
    Ok(())
}
