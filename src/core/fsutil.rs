//! Plain filesystem helpers: recursive copy, removal, path normalization.

use crate::core::error::{AipacaError, Result};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Copy a single file, creating the destination's parent directories.
/// Permissions are carried over by `fs::copy`.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src)
        .map_err(|e| AipacaError::io(format!("failed to stat {}", src.display()), e))?;
    if !meta.is_file() {
        return Err(AipacaError::InvalidInput(format!(
            "source is not a regular file: {}",
            src.display()
        )));
    }
    ensure_parent(dst)?;
    fs::copy(src, dst).map_err(|e| {
        AipacaError::io(
            format!("failed to copy {} to {}", src.display(), dst.display()),
            e,
        )
    })?;
    Ok(())
}

/// Recursively copy a directory tree into `dst` (merging with anything
/// already there).
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src)
        .map_err(|e| AipacaError::io(format!("failed to stat {}", src.display()), e))?;
    if !meta.is_dir() {
        return Err(AipacaError::InvalidInput(format!(
            "source is not a directory: {}",
            src.display()
        )));
    }

    fs::create_dir_all(dst)
        .map_err(|e| AipacaError::io(format!("failed to create {}", dst.display()), e))?;

    for entry in read_dir_sorted(src)? {
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| AipacaError::io(format!("failed to stat {}", from.display()), e))?;
        if file_type.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }
    Ok(())
}

/// Copy a file or a directory tree.
pub fn copy_path(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src)
        .map_err(|e| AipacaError::io(format!("failed to stat {}", src.display()), e))?;
    if meta.is_dir() {
        copy_dir(src, dst)
    } else {
        copy_file(src, dst)
    }
}

/// Copy every top-level entry of `src_dir` into `dst_dir`.
pub fn copy_contents(src_dir: &Path, dst_dir: &Path) -> Result<Vec<String>> {
    let mut copied = Vec::new();
    for entry in read_dir_sorted(src_dir)? {
        let name = entry.file_name();
        copy_path(&entry.path(), &dst_dir.join(&name))?;
        copied.push(name.to_string_lossy().to_string());
    }
    Ok(copied)
}

/// Remove a file, symlink or directory tree. A missing path is not an error.
pub fn remove_path(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(AipacaError::io(
                format!("failed to stat {}", path.display()),
                e,
            ));
        }
    };

    let outcome = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    outcome.map_err(|e| AipacaError::io(format!("failed to remove {}", path.display()), e))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| AipacaError::io(format!("failed to create {}", path.display()), e))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| AipacaError::io(format!("failed to read {}", dir.display()), e))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| AipacaError::io(format!("failed to read {}", dir.display()), e))?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Make `path` absolute against the current directory and resolve `.` and
/// `..` lexically. Symlinks are not resolved.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize_lexically(&joined))
}

pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root.
                if !matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
