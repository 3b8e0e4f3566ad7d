//! CLI struct definitions for the aipaca command-line interface.
//!
//! Top-level clap types live here; each command's arguments live next to the
//! operation in `operations/`.

use crate::operations::{
    apply::ApplyCli, backups::BackupsCli, clean::CleanCli, diff::DiffCli, init::InitCli,
    profiles::ProfilesCli, restore::RestoreCli, save::SaveCli, status::StatusCli,
};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "aipaca",
    version = env!("CARGO_PKG_VERSION"),
    about = "Herd your AI assistant configs across repositories 🦙"
)]
pub(crate) struct Cli {
    /// Config file (default: $AIPACA_CONFIG or ~/.aipaca.yaml)
    #[clap(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create the config file and storage directories
    Init(InitCli),
    /// Apply a profile to a repository
    Apply(ApplyCli),
    /// Save a repository's AI files to a profile
    Save(SaveCli),
    /// Remove AI files from a repository
    Clean(CleanCli),
    /// Restore AI files from a backup
    Restore(RestoreCli),
    /// Show differences between a repository and a profile
    Diff(DiffCli),
    /// Show the current state of AI files in a repository
    Status(StatusCli),
    /// Manage profiles
    Profiles(ProfilesCli),
    /// Manage backups
    Backups(BackupsCli),
}
