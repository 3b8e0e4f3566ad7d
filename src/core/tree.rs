//! Recursive file listing relative to a root directory.

use crate::core::error::{AipacaError, Result};
use std::fs;
use std::io;
use std::path::{Component, Path};
use tracing::warn;
use walkdir::WalkDir;

/// Every non-directory entry under `dir`, relative to it and joined with `/`.
///
/// Traversal is depth-first and lexical within each directory, so the order
/// is stable for a given filesystem state. Symlinks are listed, not followed.
pub fn list_all_files(dir: &Path) -> Result<Vec<String>> {
    let meta = fs::metadata(dir)
        .map_err(|e| AipacaError::io(format!("failed to list {}", dir.display()), e))?;
    if !meta.is_dir() {
        return Err(AipacaError::InvalidInput(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let context = match e.path() {
                Some(p) => format!("failed to list {}", p.display()),
                None => format!("failed to list {}", dir.display()),
            };
            AipacaError::io(context, io::Error::from(e))
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let rel = entry.path().strip_prefix(dir).map_err(|_| {
            AipacaError::InvalidInput(format!(
                "{} escaped {}",
                entry.path().display(),
                dir.display()
            ))
        })?;
        files.push(rel_key(rel));
    }
    Ok(files)
}

pub fn count_files(dir: &Path) -> Result<usize> {
    Ok(list_all_files(dir)?.len())
}

/// File count for display. An unreadable directory counts as 0 and is
/// logged.
pub fn count_files_or_warn(dir: &Path) -> usize {
    count_files(dir).unwrap_or_else(|e| {
        warn!(dir = %dir.display(), error = %e, "failed to count files");
        0
    })
}

/// Render a relative path with `/` separators regardless of host OS.
pub fn rel_key(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
