//! User-visible operations.
//!
//! Each module owns one command: its options/result types, the operation
//! itself (pure library call taking `&Config` and `&Store`), its clap
//! arguments and the `run_*_cli` function that prints results.

pub mod apply;
pub mod backups;
pub mod clean;
pub mod diff;
pub mod init;
pub mod profiles;
pub mod restore;
pub mod save;
pub mod status;

use crate::core::config::Config;
use crate::core::error::{AipacaError, Result};
use crate::core::fsutil;
use crate::core::pathset::{self, AiFileSet};
use crate::core::store::{self, Store};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Resolve an optional repository argument to an absolute, existing
/// directory. `None` means the current working directory.
pub fn resolve_repo_path(repo: Option<&Path>) -> Result<PathBuf> {
    let raw = match repo {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().map_err(|e| {
            AipacaError::io("failed to get current directory", e)
        })?,
    };
    let abs = fsutil::absolutize(&raw)?;
    if !abs.is_dir() {
        return Err(AipacaError::InvalidInput(format!(
            "repository path is not a directory: {}",
            abs.display()
        )));
    }
    Ok(abs)
}

/// The repository's current AI file set, minus anything that would put
/// aipaca's own storage or the loaded config file at risk (e.g. `.ai*` run
/// in `$HOME` matches `.aipaca/` and `.aipaca.yaml`).
pub fn discover(cfg: &Config, store: &Store, repo: &Path) -> AiFileSet {
    let mut set = pathset::expand(repo, &cfg.ai_patterns);
    set.retain(|rel, abs| {
        let protected = store::is_within(&store.root, abs)
            || store::is_within(abs, &store.root)
            || cfg.source.as_deref().is_some_and(|src| store::is_within(src, abs));
        if protected {
            warn!(path = %rel, "not treating aipaca's own storage or config as an AI file");
        }
        !protected
    });
    set
}
