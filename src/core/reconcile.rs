//! Two-tree reconciliation between a repository's AI files and a stored
//! profile or backup.
//!
//! This is a direct set-and-content diff with no common ancestor: every
//! path present in either tree lands in exactly one bucket (added, removed,
//! modified) or in none when both sides hold identical bytes. When the
//! content of a path present on both sides cannot be read, it is not
//! reported as a change but is listed in [`DiffReport::undetermined`].

use crate::core::checksum;
use crate::core::error::{AipacaError, Result};
use crate::core::pathset::AiFileSet;
use crate::core::tree::list_all_files;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Relative path (`/`-separated) -> absolute path of a regular file.
pub type FileTree = BTreeMap<String, PathBuf>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// In the repository, not in the reference.
    Added,
    /// In the reference, missing from the repository.
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    /// Sorted by path.
    pub changes: Vec<FileChange>,
    /// Present on both sides but unreadable on at least one.
    pub undetermined: Vec<String>,
}

impl DiffReport {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}

/// Decides whether two files hold the same bytes.
pub trait ContentComparator {
    fn same_content(&self, left: &Path, right: &Path) -> io::Result<bool>;
}

/// Streaming byte-for-byte comparison with an early length check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteComparator;

impl ContentComparator for ByteComparator {
    fn same_content(&self, left: &Path, right: &Path) -> io::Result<bool> {
        if fs::metadata(left)?.len() != fs::metadata(right)?.len() {
            return Ok(false);
        }

        let mut l = BufReader::new(File::open(left)?);
        let mut r = BufReader::new(File::open(right)?);
        loop {
            let lb = l.fill_buf()?;
            let rb = r.fill_buf()?;
            if lb.is_empty() && rb.is_empty() {
                return Ok(true);
            }
            let n = lb.len().min(rb.len());
            if n == 0 || lb[..n] != rb[..n] {
                return Ok(false);
            }
            l.consume(n);
            r.consume(n);
        }
    }
}

/// Compares SHA-256 digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumComparator;

impl ContentComparator for ChecksumComparator {
    fn same_content(&self, left: &Path, right: &Path) -> io::Result<bool> {
        Ok(checksum::file_checksum(left)? == checksum::file_checksum(right)?)
    }
}

pub fn reconcile(
    repo: &FileTree,
    reference: &FileTree,
    comparator: &dyn ContentComparator,
) -> DiffReport {
    let mut report = DiffReport::default();

    for (rel, repo_path) in repo {
        match reference.get(rel) {
            None => report.changes.push(FileChange {
                path: rel.clone(),
                kind: ChangeKind::Added,
            }),
            Some(ref_path) => match comparator.same_content(repo_path, ref_path) {
                Ok(true) => {}
                Ok(false) => report.changes.push(FileChange {
                    path: rel.clone(),
                    kind: ChangeKind::Modified,
                }),
                Err(e) => {
                    debug!(path = %rel, error = %e, "content comparison failed");
                    report.undetermined.push(rel.clone());
                }
            },
        }
    }

    for rel in reference.keys() {
        if !repo.contains_key(rel) {
            report.changes.push(FileChange {
                path: rel.clone(),
                kind: ChangeKind::Removed,
            });
        }
    }

    report
        .changes
        .sort_by(|a, b| a.path.cmp(&b.path).then(a.kind.cmp(&b.kind)));
    report
}

/// Expand directory entries of an AI file set into their individual files,
/// keyed as `<entry>/<file>`.
pub fn flatten(set: &AiFileSet) -> Result<FileTree> {
    let mut tree = FileTree::new();
    for (rel, abs) in set {
        let meta = fs::metadata(abs)
            .map_err(|e| AipacaError::io(format!("failed to stat {}", abs.display()), e))?;
        if meta.is_dir() {
            for child in list_all_files(abs)? {
                tree.insert(format!("{}/{}", rel, child), abs.join(&child));
            }
        } else {
            tree.insert(rel.clone(), abs.clone());
        }
    }
    Ok(tree)
}

/// Full file listing of a stored profile or backup directory.
pub fn reference_tree(dir: &Path) -> Result<FileTree> {
    Ok(list_all_files(dir)?
        .into_iter()
        .map(|rel| {
            let abs = dir.join(&rel);
            (rel, abs)
        })
        .collect())
}
