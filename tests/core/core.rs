use aipaca::core::config::{Config, default_patterns};
use aipaca::core::error::AipacaError;
use aipaca::core::pathset::{self, AiFileSet};
use aipaca::core::reconcile::{
    self, ByteComparator, ChangeKind, ChecksumComparator, ContentComparator, FileChange, FileTree,
};
use aipaca::core::store::{self, Store};
use aipaca::core::tree;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, body).expect("write");
}

fn pats(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

/// A repository with the usual mix of assistant files and ordinary sources.
fn sample_repo(root: &Path) {
    write(root, ".claude/settings.json", "{\"model\":\"x\"}");
    write(root, ".claude/commands/review.md", "review");
    write(root, "CLAUDE.md", "root rules");
    write(root, "docs/CLAUDE.md", "docs rules");
    write(root, "ai/notes.md", "notes");
    write(root, ".aider.conf.yml", "model: y");
    write(root, "src/main.rs", "fn main() {}");
    write(root, "README.md", "readme");
}

#[test]
fn expansion_is_idempotent() {
    let tmp = tempdir().expect("tempdir");
    sample_repo(tmp.path());
    let patterns = default_patterns();

    let first = pathset::expand(tmp.path(), &patterns);
    let second = pathset::expand(tmp.path(), &patterns);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn default_patterns_claim_top_level_entries_only() {
    let tmp = tempdir().expect("tempdir");
    sample_repo(tmp.path());

    let set = pathset::expand(tmp.path(), &default_patterns());
    assert_eq!(
        set.rel_paths(),
        vec![".aider.conf.yml", ".claude", "CLAUDE.md", "ai", "docs/CLAUDE.md"]
    );

    let keys = set.rel_paths();
    for a in &keys {
        for b in &keys {
            assert!(
                !b.starts_with(&format!("{}/", a)),
                "{} is nested under {}",
                b,
                a
            );
        }
    }
}

#[test]
fn settings_and_claude_md_yield_two_keys() {
    let tmp = tempdir().expect("tempdir");
    write(tmp.path(), ".claude/settings.json", "{}");
    write(tmp.path(), "CLAUDE.md", "rules");

    let set = pathset::expand(tmp.path(), &pats(&[".claude/**", "CLAUDE.md"]));
    assert_eq!(set.len(), 2);
    assert_eq!(set.get(".claude"), Some(tmp.path().join(".claude").as_path()));
    assert_eq!(set.get("CLAUDE.md"), Some(tmp.path().join("CLAUDE.md").as_path()));
}

#[test]
fn expansion_skips_absent_and_hostile_patterns() {
    let tmp = tempdir().expect("tempdir");
    write(tmp.path(), "CLAUDE.md", "rules");

    let set = pathset::expand(
        tmp.path(),
        &pats(&["missing.md", "/etc/hosts", "../outside", "[unclosed", "CLAUDE.md"]),
    );
    assert_eq!(set.rel_paths(), vec!["CLAUDE.md"]);
}

#[cfg(unix)]
#[test]
fn dangling_symlinks_are_not_ai_files() {
    let tmp = tempdir().expect("tempdir");
    write(tmp.path(), ".claude/settings.json", "{}");
    std::os::unix::fs::symlink(tmp.path().join("gone.md"), tmp.path().join("CLAUDE.md"))
        .expect("symlink");
    std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join(".aider.conf"))
        .expect("symlink");

    let set = pathset::expand(tmp.path(), &default_patterns());
    assert_eq!(set.rel_paths(), vec![".claude"]);
}

#[test]
fn base_directory_with_glob_characters_is_escaped() {
    let tmp = tempdir().expect("tempdir");
    let repo = tmp.path().join("repo[1]");
    write(&repo, "docs/CLAUDE.md", "x");

    let set = pathset::expand(&repo, &pats(&["**/CLAUDE.md"]));
    assert_eq!(set.rel_paths(), vec!["docs/CLAUDE.md"]);
}

#[test]
fn diff_of_a_tree_against_itself_is_empty() {
    let tmp = tempdir().expect("tempdir");
    sample_repo(tmp.path());
    let set = pathset::expand(tmp.path(), &default_patterns());
    let flat = reconcile::flatten(&set).expect("flatten");

    let report = reconcile::reconcile(&flat, &flat, &ByteComparator);
    assert!(!report.has_changes());
    assert!(report.undetermined.is_empty());
}

#[test]
fn diff_puts_every_path_in_exactly_one_bucket() {
    let tmp = tempdir().expect("tempdir");
    let repo = tmp.path().join("repo");
    let profile = tmp.path().join("profile");

    write(&repo, "CLAUDE.md", "same");
    write(&repo, ".claude/settings.json", "repo version");
    write(&repo, ".claude/extra.md", "only in repo");
    write(&profile, "CLAUDE.md", "same");
    write(&profile, ".claude/settings.json", "profile version");
    write(&profile, ".cursor/rules.md", "only in profile");

    let repo_tree =
        reconcile::flatten(&pathset::expand(&repo, &default_patterns())).expect("flatten");
    let profile_tree = reconcile::reference_tree(&profile).expect("listing");

    let comparators: [&dyn ContentComparator; 2] = [&ByteComparator, &ChecksumComparator];
    for comparator in comparators {
        let report = reconcile::reconcile(&repo_tree, &profile_tree, comparator);
        assert_eq!(
            report.changes,
            vec![
                FileChange {
                    path: ".claude/extra.md".into(),
                    kind: ChangeKind::Added
                },
                FileChange {
                    path: ".claude/settings.json".into(),
                    kind: ChangeKind::Modified
                },
                FileChange {
                    path: ".cursor/rules.md".into(),
                    kind: ChangeKind::Removed
                },
            ]
        );
    }
}

#[test]
fn unreadable_side_is_undetermined_not_a_change() {
    let tmp = tempdir().expect("tempdir");
    write(tmp.path(), "a/CLAUDE.md", "x");

    let mut repo = FileTree::new();
    repo.insert("CLAUDE.md".into(), tmp.path().join("a/CLAUDE.md"));
    let mut reference = FileTree::new();
    reference.insert("CLAUDE.md".into(), tmp.path().join("vanished/CLAUDE.md"));

    let report = reconcile::reconcile(&repo, &reference, &ByteComparator);
    assert!(!report.has_changes());
    assert_eq!(report.undetermined, vec!["CLAUDE.md"]);
}

#[test]
fn flatten_expands_directory_entries() {
    let tmp = tempdir().expect("tempdir");
    sample_repo(tmp.path());
    let set: AiFileSet = pathset::expand(tmp.path(), &pats(&[".claude/**", "CLAUDE.md"]));

    let flat = reconcile::flatten(&set).expect("flatten");
    let keys: Vec<&String> = flat.keys().collect();
    assert_eq!(
        keys,
        vec![".claude/commands/review.md", ".claude/settings.json", "CLAUDE.md"]
    );
}

#[test]
fn tree_listing_is_sorted_and_files_only() {
    let tmp = tempdir().expect("tempdir");
    sample_repo(tmp.path());
    let files = tree::list_all_files(&tmp.path().join(".claude")).expect("listing");
    assert_eq!(files, vec!["commands/review.md", "settings.json"]);
    assert_eq!(tree::count_files(tmp.path()).expect("count"), 8);
}

#[test]
fn store_layout_and_name_validation() {
    let tmp = tempdir().expect("tempdir");
    let cfg = Config::with_storage(&tmp.path().join("store"));
    let store = Store::from_config(&cfg);
    assert!(!store.is_initialized());
    store.init().expect("init");
    assert!(store.is_initialized());
    assert!(store.profiles_dir().is_dir());
    assert!(store.backups_dir().is_dir());
    assert!(store.state_dir().is_dir());

    for bad in ["", ".", "..", "a/b", "../escape", "with space"] {
        assert!(
            matches!(
                store::validate_name("profile", bad),
                Err(AipacaError::InvalidInput(_))
            ),
            "{:?} should be rejected",
            bad
        );
    }
    store::validate_name("profile", "work-2025.v1_b").expect("valid name");
}
