use aipaca::core::config::Config;
use aipaca::core::error::AipacaError;
use aipaca::core::store::Store;
use aipaca::operations::apply::{ApplyOptions, apply};
use aipaca::operations::backups;
use aipaca::operations::diff::{DiffOptions, diff};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

struct Fixture {
    _tmp: TempDir,
    cfg: Config,
    store: Store,
    repo: PathBuf,
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, body).expect("write");
}

fn setup() -> Fixture {
    let tmp = tempdir().expect("tempdir");
    let cfg = Config::with_storage(&tmp.path().join("store"));
    let store = Store::from_config(&cfg);
    store.init().expect("init store");

    let repo = tmp.path().join("api");
    write(&repo, "CLAUDE.md", "original rules");
    write(&repo, ".claude/settings.json", "{\"original\":true}");
    write(&repo, "src/lib.rs", "pub fn f() {}");

    let work = store.profile_path("work").expect("profile path");
    write(&work, "CLAUDE.md", "work rules");
    write(&work, ".cursor/rules.md", "cursor rules");

    Fixture {
        _tmp: tmp,
        cfg,
        store,
        repo,
    }
}

fn opts(fx: &Fixture, profile: &str) -> ApplyOptions {
    ApplyOptions {
        profile_name: profile.to_string(),
        repo_path: Some(fx.repo.clone()),
        ..ApplyOptions::default()
    }
}

#[test]
fn apply_then_diff_reports_no_changes() {
    let fx = setup();
    let result = apply(&fx.cfg, &fx.store, &opts(&fx, "work")).expect("apply");

    assert_eq!(result.files_applied, vec![".cursor/rules.md", "CLAUDE.md"]);
    assert_eq!(result.files_removed, vec![".claude", "CLAUDE.md"]);
    assert!(result.unmanaged.is_empty());

    assert!(!fx.repo.join(".claude").exists());
    assert_eq!(
        fs::read_to_string(fx.repo.join("CLAUDE.md")).expect("read"),
        "work rules"
    );
    assert!(fx.repo.join("src/lib.rs").exists());

    let d = diff(
        &fx.cfg,
        &fx.store,
        &DiffOptions {
            profile_name: None,
            repo_path: Some(fx.repo.clone()),
        },
    )
    .expect("diff");
    assert_eq!(d.profile_name, "work");
    assert!(!d.has_changes());
}

#[test]
fn apply_records_state_and_backup() {
    let fx = setup();
    let result = apply(&fx.cfg, &fx.store, &opts(&fx, "work")).expect("apply");

    let backup = result.backup_name.expect("backup created");
    assert!(backup.starts_with("api-"));
    let files = backups::backup_files(&fx.store, &backup).expect("backup listing");
    assert_eq!(files, vec![".claude/settings.json", "CLAUDE.md"]);

    let state = fx
        .store
        .state()
        .get(&fx.repo)
        .expect("state")
        .expect("entry");
    assert_eq!(state.applied_profile.as_deref(), Some("work"));
    assert_eq!(state.backup_path.as_deref(), Some(backup.as_str()));
    assert!(state.applied_at.is_some());
}

#[test]
fn dry_run_changes_nothing_and_lists_the_same_files() {
    let fx = setup();
    let mut dry = opts(&fx, "work");
    dry.dry_run = true;

    let preview = apply(&fx.cfg, &fx.store, &dry).expect("dry run");
    assert!(preview.backup_name.is_none());
    assert!(fx.repo.join(".claude/settings.json").exists());
    assert_eq!(
        fs::read_to_string(fx.repo.join("CLAUDE.md")).expect("read"),
        "original rules"
    );
    assert!(backups::list_backups(&fx.store).expect("list").is_empty());
    assert!(fx.store.state().get(&fx.repo).expect("state").is_none());

    let real = apply(&fx.cfg, &fx.store, &opts(&fx, "work")).expect("apply");
    assert_eq!(preview.files_applied, real.files_applied);
    assert_eq!(preview.files_removed, real.files_removed);
}

#[test]
fn no_backup_skips_the_snapshot() {
    let fx = setup();
    let mut o = opts(&fx, "work");
    o.no_backup = true;

    let result = apply(&fx.cfg, &fx.store, &o).expect("apply");
    assert!(result.backup_name.is_none());
    assert!(backups::list_backups(&fx.store).expect("list").is_empty());
    assert_eq!(
        fx.store.state().applied_profile(&fx.repo).expect("state").as_deref(),
        Some("work")
    );
}

#[test]
fn missing_profile_is_not_found() {
    let fx = setup();
    let err = apply(&fx.cfg, &fx.store, &opts(&fx, "ghost")).expect_err("should fail");
    assert!(matches!(err, AipacaError::NotFound(_)));
    assert!(fx.repo.join("CLAUDE.md").exists());
}

#[test]
fn empty_profile_needs_force() {
    let fx = setup();
    fs::create_dir_all(fx.store.profile_path("blank").expect("path")).expect("mkdir");

    let err = apply(&fx.cfg, &fx.store, &opts(&fx, "blank")).expect_err("should refuse");
    assert!(matches!(err, AipacaError::InvalidInput(_)));
    assert!(fx.repo.join("CLAUDE.md").exists());

    let mut forced = opts(&fx, "blank");
    forced.force = true;
    let result = apply(&fx.cfg, &fx.store, &forced).expect("forced apply");
    assert!(result.files_applied.is_empty());
    assert!(!fx.repo.join("CLAUDE.md").exists());
    assert!(!fx.repo.join(".claude").exists());
}

#[test]
fn profile_files_outside_the_patterns_are_reported() {
    let fx = setup();
    let work = fx.store.profile_path("work").expect("path");
    write(&work, "NOTES.txt", "not an AI file");

    let result = apply(&fx.cfg, &fx.store, &opts(&fx, "work")).expect("apply");
    assert_eq!(result.unmanaged, vec!["NOTES.txt"]);
    assert!(fx.repo.join("NOTES.txt").exists());
}

#[test]
fn repo_must_be_a_directory() {
    let fx = setup();
    let mut o = opts(&fx, "work");
    o.repo_path = Some(fx.repo.join("does-not-exist"));
    let err = apply(&fx.cfg, &fx.store, &o).expect_err("should fail");
    assert!(matches!(err, AipacaError::InvalidInput(_)));
}
