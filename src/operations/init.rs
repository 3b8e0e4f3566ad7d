//! `aipaca init`: write the default config and create the storage layout.

use crate::core::config::Config;
use crate::core::error::{AipacaError, Result};
use crate::core::fsutil;
use crate::core::output;
use crate::core::store::Store;
use crate::operations::{discover, profiles, resolve_repo_path};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug, Default)]
pub struct InitCli {
    /// Import the current directory's AI files as the default profile
    #[clap(long)]
    pub import: bool,
    /// Storage root for a new config (default ~/.aipaca)
    #[clap(long, value_name = "PATH")]
    pub storage: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub config_created: bool,
    pub storage_root: PathBuf,
    /// Set when `--import` saved a profile.
    pub imported_profile: Option<String>,
}

/// Create (or reuse) the config at `config_path` and the storage layout it
/// points to. An existing config is never overwritten.
pub fn init(config_path: &Path, opts: &InitCli) -> Result<(Config, InitOutcome)> {
    let config_created = !Config::exists(config_path);
    let cfg = if config_created {
        let mut cfg = match &opts.storage {
            Some(root) => Config::with_storage(&fsutil::absolutize(root)?),
            None => Config::default(),
        };
        cfg.save(config_path)?;
        cfg.source = Some(fsutil::absolutize(config_path)?);
        info!(path = %config_path.display(), "wrote default config");
        cfg
    } else {
        Config::load(config_path)?
    };

    let store = Store::from_config(&cfg);
    store.init()?;

    let mut imported_profile = None;
    if opts.import {
        let repo = resolve_repo_path(None)?;
        let set = discover(&cfg, &store, &repo);
        match profiles::save_to_profile(&store, &cfg.default_profile, &set) {
            Ok(_) => imported_profile = Some(cfg.default_profile.clone()),
            Err(AipacaError::InvalidInput(_)) => {}
            Err(e) => return Err(e),
        }
    }

    let outcome = InitOutcome {
        config_created,
        storage_root: store.root.clone(),
        imported_profile,
    };
    Ok((cfg, outcome))
}

pub fn run_init(config_path: &Path, cli: InitCli) -> Result<()> {
    let (_, outcome) = init(config_path, &cli)?;

    if outcome.config_created {
        output::print_success(&format!("Created config file at {}", config_path.display()));
    } else {
        output::print_warning(&format!(
            "Config file already exists at {}",
            config_path.display()
        ));
        if cli.storage.is_some() {
            output::print_warning("Ignoring --storage, the existing config is kept");
        }
    }
    output::print_success(&format!(
        "Initialized storage at {}",
        outcome.storage_root.display()
    ));

    if cli.import {
        match &outcome.imported_profile {
            Some(name) => output::print_success(&format!(
                "Imported AI files from current directory as '{}' profile",
                name
            )),
            None => output::print_warning("No AI files found in current directory to import"),
        }
    }

    println!();
    println!("🦙 aipaca is ready to herd your configs! Try these commands:");
    println!("  aipaca status          # Check current state");
    println!("  aipaca profiles list   # List available profiles");
    println!("  aipaca apply <profile> # Apply a profile");
    Ok(())
}
