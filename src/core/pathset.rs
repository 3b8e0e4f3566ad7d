//! Pattern expansion: which entries of a repository are "AI files".
//!
//! A pattern is one of
//! - a directory-contents marker (`.claude/**`), which claims the directory
//!   itself as a single entry,
//! - a literal relative path (`CLAUDE.md`, `ai/`), claimed if it exists,
//! - a wildcard (`**/CLAUDE.md`, `.ai*`), resolved by globbing.
//!
//! The resulting [`AiFileSet`] is top-level collapsed: once a directory is
//! claimed, nothing beneath it appears as a separate key. Keys use `/`
//! separators and iterate in lexical order.

use crate::core::tree::rel_key;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Canonical relative path -> absolute path for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiFileSet {
    entries: BTreeMap<String, PathBuf>,
}

impl AiFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, rel: &str) -> Option<&Path> {
        self.entries.get(rel).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PathBuf> {
        self.entries.iter()
    }

    /// Keys in lexical order.
    pub fn rel_paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// True when `rel` lies strictly beneath a key already in the set.
    pub fn is_covered(&self, rel: &str) -> bool {
        rel.match_indices('/')
            .any(|(idx, _)| self.entries.contains_key(&rel[..idx]))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Path) -> bool) {
        self.entries.retain(|rel, abs| keep(rel, abs));
    }

    fn insert(&mut self, rel: String, abs: PathBuf) {
        if self.is_covered(&rel) {
            debug!(path = %rel, "skipping entry nested under a claimed directory");
            return;
        }
        self.entries.entry(rel).or_insert(abs);
    }

    /// Drop keys nested under other keys. Needed when a wildcard pattern
    /// listed before a directory pattern already claimed one of its children.
    fn collapse(&mut self) {
        let nested: Vec<String> = self
            .entries
            .keys()
            .filter(|k| self.is_covered(k))
            .cloned()
            .collect();
        for key in nested {
            debug!(path = %key, "collapsing into its top-level directory");
            self.entries.remove(&key);
        }
    }
}

impl<'a> IntoIterator for &'a AiFileSet {
    type Item = (&'a String, &'a PathBuf);
    type IntoIter = btree_map::Iter<'a, String, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatternKind {
    /// Empty, bare wildcard, absolute, or escaping the base directory.
    Ignored,
    /// `dir/**`: the directory (possibly itself a glob) as one entry.
    DirContents(String),
    /// No wildcard; trailing `/` stripped.
    Literal(String),
    Wildcard(String),
}

pub(crate) fn classify(pattern: &str) -> PatternKind {
    let pattern = pattern.trim();
    if matches!(pattern, "" | "*" | "**") {
        return PatternKind::Ignored;
    }

    if let Some(stripped) = pattern.strip_suffix("/**") {
        return match clean_relative(stripped) {
            Some(dir) if !dir.is_empty() => PatternKind::DirContents(dir),
            _ => PatternKind::Ignored,
        };
    }

    let cleaned = match clean_relative(pattern) {
        Some(cleaned) if !cleaned.is_empty() => cleaned,
        _ => return PatternKind::Ignored,
    };
    if cleaned.contains('*') {
        PatternKind::Wildcard(cleaned)
    } else {
        PatternKind::Literal(cleaned)
    }
}

/// Normalize a relative pattern: drop `.` parts and trailing `/`. Returns
/// `None` for absolute patterns and patterns containing `..`.
fn clean_relative(raw: &str) -> Option<String> {
    let path = Path::new(raw);
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

/// Expand `patterns` against `base_dir`.
///
/// Never fails: nonexistent paths, unreadable directories and malformed
/// globs are skipped (the latter two with a warning).
pub fn expand(base_dir: &Path, patterns: &[String]) -> AiFileSet {
    let mut set = AiFileSet::new();

    for raw in patterns {
        match classify(raw) {
            PatternKind::Ignored => {
                if !matches!(raw.trim(), "" | "*" | "**") {
                    warn!(pattern = %raw, "ignoring pattern outside the repository");
                }
            }
            PatternKind::DirContents(dir) if dir.contains('*') => {
                for (rel, abs) in glob_matches(base_dir, &dir) {
                    if abs.is_dir() {
                        set.insert(rel, abs);
                    }
                }
            }
            PatternKind::DirContents(dir) => {
                let abs = base_dir.join(&dir);
                if abs.is_dir() {
                    set.insert(dir, abs);
                }
            }
            PatternKind::Literal(rel) => {
                let abs = base_dir.join(&rel);
                if abs.exists() {
                    set.insert(rel, abs);
                }
            }
            PatternKind::Wildcard(glob) => {
                for (rel, abs) in glob_matches(base_dir, &glob) {
                    if abs.exists() {
                        set.insert(rel, abs);
                    } else {
                        debug!(path = %rel, "skipping dangling symlink");
                    }
                }
            }
        }
    }

    set.collapse();
    debug!(base = %base_dir.display(), entries = set.len(), "expanded AI file set");
    set
}

fn glob_matches(base_dir: &Path, pattern: &str) -> Vec<(String, PathBuf)> {
    let base = Pattern::escape(&base_dir.to_string_lossy());
    let full = format!("{}/{}", base.trim_end_matches('/'), pattern);

    let paths = match glob::glob_with(&full, MATCH_OPTIONS) {
        Ok(paths) => paths,
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "skipping invalid glob pattern");
            return Vec::new();
        }
    };

    let mut out = Vec::new();
    for entry in paths {
        match entry {
            Ok(abs) => match abs.strip_prefix(base_dir) {
                Ok(rel) if !rel.as_os_str().is_empty() => out.push((rel_key(rel), abs.clone())),
                _ => debug!(path = %abs.display(), "glob match outside base directory"),
            },
            Err(e) => warn!(error = %e, "skipping unreadable path during glob"),
        }
    }
    out
}

/// Whether a relative path (or one of its ancestors) is matched by any
/// pattern. Pure string matching; the filesystem is not consulted.
pub fn matches_any(rel: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|raw| match classify(raw) {
        PatternKind::Ignored => false,
        PatternKind::Literal(p) => is_same_or_beneath(rel, &p),
        PatternKind::DirContents(p) if !p.contains('*') => is_same_or_beneath(rel, &p),
        PatternKind::DirContents(p) | PatternKind::Wildcard(p) => match Pattern::new(&p) {
            Ok(glob) => ancestors_and_self(rel).any(|candidate| {
                glob.matches_with(candidate, MATCH_OPTIONS)
            }),
            Err(_) => false,
        },
    })
}

fn is_same_or_beneath(rel: &str, key: &str) -> bool {
    rel == key
        || rel
            .strip_prefix(key)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn ancestors_and_self(rel: &str) -> impl Iterator<Item = &str> {
    rel.match_indices('/')
        .map(move |(idx, _)| &rel[..idx])
        .chain(std::iter::once(rel))
}
