//! Profile catalogue: list, show, create, delete, copy, and the two copy
//! directions between a profile and a repository.

use crate::core::checksum;
use crate::core::config::Config;
use crate::core::error::{AipacaError, Result};
use crate::core::fsutil;
use crate::core::output::{self, compact_line};
use crate::core::pathset::AiFileSet;
use crate::core::store::Store;
use crate::core::tree;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: String,
    pub path: PathBuf,
    pub description: Option<String>,
    pub file_count: usize,
}

fn describe(cfg: &Config, name: &str, path: PathBuf) -> Profile {
    let file_count = tree::count_files_or_warn(&path);
    Profile {
        name: name.to_string(),
        description: cfg.profile_description(name).map(str::to_string),
        path,
        file_count,
    }
}

/// All profiles, sorted by name. A missing profiles directory is empty.
pub fn list_profiles(store: &Store, cfg: &Config) -> Result<Vec<Profile>> {
    let dir = store.profiles_dir();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(AipacaError::io(
                format!("failed to read profiles directory {}", dir.display()),
                e,
            ));
        }
    };

    let mut profiles = Vec::new();
    for entry in entries {
        let entry = entry.map_err(AipacaError::IoError)?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        profiles.push(describe(cfg, &name, entry.path()));
    }
    profiles.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(profiles)
}

pub fn get_profile(store: &Store, cfg: &Config, name: &str) -> Result<Profile> {
    let path = store.profile_path(name)?;
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => Ok(describe(cfg, name, path)),
        Ok(_) => Err(AipacaError::InvalidInput(format!(
            "profile '{}' is not a directory",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AipacaError::NotFound(format!("profile '{}'", name)))
        }
        Err(e) => Err(AipacaError::io(format!("failed to access profile '{}'", name), e)),
    }
}

pub fn create_profile(store: &Store, name: &str) -> Result<PathBuf> {
    let path = store.profile_path(name)?;
    if path.exists() {
        return Err(AipacaError::AlreadyExists(format!("profile '{}'", name)));
    }
    fsutil::ensure_dir(&path)?;
    Ok(path)
}

pub fn delete_profile(store: &Store, name: &str) -> Result<()> {
    let path = store.profile_path(name)?;
    if !path.exists() {
        return Err(AipacaError::NotFound(format!("profile '{}'", name)));
    }
    fsutil::remove_path(&path)?;
    info!(profile = %name, "deleted profile");
    Ok(())
}

pub fn copy_profile(store: &Store, src: &str, dst: &str) -> Result<()> {
    let src_path = store.profile_path(src)?;
    let dst_path = store.profile_path(dst)?;
    if !src_path.is_dir() {
        return Err(AipacaError::NotFound(format!("source profile '{}'", src)));
    }
    if dst_path.exists() {
        return Err(AipacaError::AlreadyExists(format!(
            "destination profile '{}'",
            dst
        )));
    }
    if let Err(e) = fsutil::copy_dir(&src_path, &dst_path) {
        if let Err(cleanup) = fsutil::remove_path(&dst_path) {
            warn!(profile = %dst, error = %cleanup, "failed to remove partial profile copy");
        }
        return Err(e);
    }
    info!(from = %src, to = %dst, "copied profile");
    Ok(())
}

pub fn profile_files(store: &Store, name: &str) -> Result<Vec<String>> {
    let path = store.profile_path(name)?;
    if !path.is_dir() {
        return Err(AipacaError::NotFound(format!("profile '{}'", name)));
    }
    tree::list_all_files(&path)
}

/// Copy a profile's top-level entries into `repo`.
pub fn apply_profile(store: &Store, name: &str, repo: &Path) -> Result<Vec<String>> {
    let path = store.profile_path(name)?;
    if !path.is_dir() {
        return Err(AipacaError::NotFound(format!("profile '{}'", name)));
    }
    fsutil::copy_contents(&path, repo)
}

/// Replace a profile's contents with the given AI file set.
pub fn save_to_profile(store: &Store, name: &str, set: &AiFileSet) -> Result<PathBuf> {
    if set.is_empty() {
        return Err(AipacaError::InvalidInput(
            "no AI files found in repository".to_string(),
        ));
    }

    let path = store.profile_path(name)?;
    if path.exists() {
        fsutil::remove_path(&path)?;
    }
    fsutil::ensure_dir(&path)?;

    for (rel, abs) in set {
        fsutil::copy_path(abs, &path.join(rel))?;
    }
    info!(profile = %name, entries = set.len(), "saved profile");
    Ok(path)
}

#[derive(Args, Debug)]
pub struct ProfilesCli {
    #[clap(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfilesCommand {
    /// List all profiles
    List,
    /// Show profile contents
    Show {
        /// Profile name
        profile: String,
    },
    /// Delete a profile
    Delete {
        /// Profile name
        profile: String,
    },
    /// Copy a profile under a new name
    Copy {
        /// Existing profile
        source: String,
        /// New profile name
        destination: String,
    },
}

pub fn run_profiles_cli(cfg: &Config, store: &Store, cli: ProfilesCli) -> Result<()> {
    match cli.command {
        ProfilesCommand::List => {
            let profiles = list_profiles(store, cfg)?;
            if profiles.is_empty() {
                println!("No profiles found in the herd 🦙");
                println!();
                println!("Create one with:");
                println!("  aipaca save --as <profile-name>");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = profiles
                .iter()
                .map(|p| {
                    vec![
                        p.name.clone(),
                        p.description
                            .as_deref()
                            .map(|d| compact_line(d, 40))
                            .unwrap_or_else(|| "-".to_string()),
                        p.file_count.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                output::render_table(&["PROFILE", "DESCRIPTION", "FILES"], &rows)
            );
        }
        ProfilesCommand::Show { profile } => {
            let p = get_profile(store, cfg, &profile)?;
            println!("Profile: {}", p.name);
            if let Some(desc) = &p.description {
                println!("Description: {}", desc);
            }
            println!("Files: {}", p.file_count);
            println!("Checksum: {}", checksum::dir_checksum(&p.path)?);
            println!();
            println!("Contents:");
            for f in profile_files(store, &profile)? {
                output::print_info(&f);
            }
        }
        ProfilesCommand::Delete { profile } => {
            get_profile(store, cfg, &profile)?;
            delete_profile(store, &profile)?;
            output::print_success(&format!("Deleted profile '{}'", profile));

            let still_applied: Vec<String> = store
                .state()
                .all()?
                .into_iter()
                .filter(|(_, s)| s.applied_profile.as_deref() == Some(profile.as_str()))
                .map(|(repo, _)| repo)
                .collect();
            if !still_applied.is_empty() {
                output::print_warning(&format!(
                    "'{}' is still recorded as applied in {}:",
                    profile,
                    output::plural(still_applied.len(), "repository", "repositories")
                ));
                for repo in still_applied {
                    output::print_info(&repo);
                }
            }
        }
        ProfilesCommand::Copy {
            source,
            destination,
        } => {
            copy_profile(store, &source, &destination)?;
            output::print_success(&format!(
                "Copied profile '{}' to '{}'",
                source, destination
            ));
        }
    }
    Ok(())
}
