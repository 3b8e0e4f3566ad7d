//! aipaca: a profile manager for AI assistant configuration files.
//!
//! Repositories accumulate assistant-specific files (`.claude/`, `CLAUDE.md`,
//! `.cursor/`, ...). aipaca keeps named **profiles** of those files in a
//! central store and swaps them in and out of any repository, snapshotting
//! what was there before as a **backup** so it can be restored.
//!
//! # Storage
//!
//! ```text
//! ~/.aipaca.yaml                 config (patterns, storage root)
//! ~/.aipaca/profiles/<name>/     one directory per profile
//! ~/.aipaca/backups/<repo>-<YYYY-MM-DD-HHMMSS>/
//! ~/.aipaca/state/repo-states.yaml
//! ```
//!
//! # Examples
//!
//! ```bash
//! aipaca init
//! aipaca save --as work          # capture this repo's AI files
//! aipaca apply personal ../side  # swap another repo over, with a backup
//! aipaca diff                    # drift against the applied profile
//! aipaca restore                 # put the original files back
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: config, storage layout, pattern expansion, reconciliation
//! - [`operations`]: one module per command, callable as a library

pub mod core;
pub mod operations;

mod cli;

use crate::cli::{Cli, Command};
use crate::core::config::{self, Config};
use crate::core::error::AipacaError;
use crate::core::store::Store;
use crate::operations::{apply, backups, clean, diff, init, profiles, restore, save, status};

use clap::Parser;
use tracing::debug;

pub fn run() -> Result<(), AipacaError> {
    let cli = Cli::parse();
    let config_path = config::resolve_config_path(cli.config.as_deref());
    debug!(config = %config_path.display(), "resolved config path");

    let command = match cli.command {
        Command::Init(init_cli) => return init::run_init(&config_path, init_cli),
        command => command,
    };

    let cfg = Config::load(&config_path)?;
    let store = Store::from_config(&cfg);

    match command {
        Command::Init(_) => unreachable!("init handled before config load"),
        Command::Apply(c) => apply::run_apply_cli(&cfg, &store, c),
        Command::Save(c) => save::run_save_cli(&cfg, &store, c),
        Command::Clean(c) => clean::run_clean_cli(&cfg, &store, c),
        Command::Restore(c) => restore::run_restore_cli(&cfg, &store, c),
        Command::Diff(c) => diff::run_diff_cli(&cfg, &store, c),
        Command::Status(c) => status::run_status_cli(&cfg, &store, c),
        Command::Profiles(c) => profiles::run_profiles_cli(&cfg, &store, c),
        Command::Backups(c) => backups::run_backups_cli(&cfg, &store, c),
    }
}
