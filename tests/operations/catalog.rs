use aipaca::core::config::Config;
use aipaca::core::error::AipacaError;
use aipaca::core::pathset;
use aipaca::core::store::Store;
use aipaca::core::time;
use aipaca::operations::apply::{ApplyOptions, apply};
use aipaca::operations::backups;
use aipaca::operations::discover;
use aipaca::operations::init::{InitCli, init};
use aipaca::operations::profiles;
use aipaca::operations::status::status;
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

    let repo = tmp.path().join("cli");
    write(&repo, "CLAUDE.md", "rules");
    write(&repo, ".claude/settings.json", "{}");

    Fixture {
        _tmp: tmp,
        cfg,
        store,
        repo,
    }
}

fn seed_backup(store: &Store, name: &str) {
    write(&store.backup_path(name).expect("path"), "CLAUDE.md", name);
}

#[test]
fn back_to_back_backups_never_merge() {
    let fx = setup();
    let set = pathset::expand(&fx.repo, &fx.cfg.ai_patterns);

    let first = backups::create_backup(&fx.store, &fx.repo, &set)
        .expect("first")
        .expect("non-empty");
    let second = backups::create_backup(&fx.store, &fx.repo, &set)
        .expect("second")
        .expect("non-empty");
    assert_ne!(first, second);

    for name in [&first, &second] {
        let (repo, _) = time::split_backup_name(name).expect("parseable name");
        assert_eq!(repo, "cli");
        assert_eq!(
            backups::backup_files(&fx.store, name).expect("listing"),
            vec![".claude/settings.json", "CLAUDE.md"]
        );
    }
    assert_eq!(
        backups::backups_for_repo(&fx.store, &fx.repo)
            .expect("for repo")
            .len(),
        2
    );
}

#[test]
fn empty_set_creates_no_backup() {
    let fx = setup();
    let none = backups::create_backup(&fx.store, &fx.repo, &pathset::AiFileSet::new())
        .expect("create");
    assert!(none.is_none());
    assert!(backups::list_backups(&fx.store).expect("list").is_empty());
}

#[test]
fn prune_keeps_the_most_recent_per_repo() {
    let fx = setup();
    for day in 1..=7 {
        seed_backup(&fx.store, &format!("cli-2025-06-0{}-120000", day));
    }
    seed_backup(&fx.store, "other-2025-06-01-120000");

    let report = backups::prune_backups(&fx.store, 5, Some(fx.repo.as_path())).expect("prune");
    assert_eq!(report.kept, 5);
    assert_eq!(
        report.deleted,
        vec!["cli-2025-06-02-120000", "cli-2025-06-01-120000"]
    );
    assert!(report.failed.is_empty());

    let left: Vec<String> = backups::list_backups(&fx.store)
        .expect("list")
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(left.len(), 6);
    assert_eq!(left[0], "cli-2025-06-07-120000");
    assert!(left.contains(&"other-2025-06-01-120000".to_string()));
}

#[test]
fn backup_lookup_and_delete() {
    let fx = setup();
    seed_backup(&fx.store, "cli-2025-06-01-120000");

    let b = backups::get_backup(&fx.store, "cli-2025-06-01-120000").expect("get");
    assert_eq!(b.file_count, 1);
    assert!(b.created_at.is_some());

    backups::delete_backup(&fx.store, "cli-2025-06-01-120000").expect("delete");
    assert!(matches!(
        backups::get_backup(&fx.store, "cli-2025-06-01-120000"),
        Err(AipacaError::NotFound(_))
    ));
    assert!(matches!(
        backups::get_backup(&fx.store, "../escape"),
        Err(AipacaError::InvalidInput(_))
    ));
}

#[test]
fn status_reports_drift_entries_and_backups() {
    let fx = setup();
    let work = fx.store.profile_path("work").expect("path");
    write(&work, "CLAUDE.md", "work rules");
    write(&work, ".claude/settings.json", "{}");
    write(&work, ".claude/agents/reviewer.md", "review");

    let fresh = status(&fx.cfg, &fx.store, Some(fx.repo.as_path())).expect("status");
    assert!(fresh.state.is_none());
    assert!(fresh.diff.is_none());
    assert_eq!(fresh.entries.len(), 2);

    apply(
        &fx.cfg,
        &fx.store,
        &ApplyOptions {
            profile_name: "work".into(),
            repo_path: Some(fx.repo.clone()),
            ..ApplyOptions::default()
        },
    )
    .expect("apply");
    write(&fx.repo, "CLAUDE.md", "edited");

    let report = status(&fx.cfg, &fx.store, Some(fx.repo.as_path())).expect("status");
    let state = report.state.as_ref().expect("state");
    assert_eq!(state.applied_profile.as_deref(), Some("work"));
    let diff = report.diff.as_ref().expect("diff");
    assert_eq!(diff.report.changes.len(), 1);
    assert_eq!(diff.report.changes[0].path, "CLAUDE.md");

    let claude_dir = report
        .entries
        .iter()
        .find(|e| e.path == ".claude")
        .expect(".claude entry");
    assert!(claude_dir.is_dir);
    assert_eq!(claude_dir.file_count, 2);
    assert_eq!(report.backups.len(), 1);

    profiles::delete_profile(&fx.store, "work").expect("delete profile");
    let orphaned = status(&fx.cfg, &fx.store, Some(fx.repo.as_path())).expect("status");
    assert!(orphaned.diff.is_none());
    assert!(orphaned.diff_error.is_some());
}

#[test]
fn init_writes_config_once() {
    let tmp = tempdir().expect("tempdir");
    let config_path = tmp.path().join("conf").join("aipaca.yaml");
    let opts = InitCli {
        import: false,
        storage: Some(tmp.path().join("herd")),
    };

    let (cfg, outcome) = init(&config_path, &opts).expect("init");
    assert!(outcome.config_created);
    assert!(config_path.is_file());
    assert!(Store::from_config(&cfg).is_initialized());

    let (again, outcome) = init(&config_path, &opts).expect("re-init");
    assert!(!outcome.config_created);
    assert_eq!(again, cfg);
}

#[test]
fn loaded_config_inside_the_repo_is_never_discovered() {
    let fx = setup();
    let config_path = fx.repo.join(".aipaca.yaml");
    fx.cfg.save(&config_path).expect("save config");
    let cfg = Config::load(&config_path).expect("load config");
    assert_eq!(cfg.source.as_deref(), Some(config_path.as_path()));

    let set = discover(&cfg, &fx.store, &fx.repo);
    assert_eq!(set.rel_paths(), vec![".claude", "CLAUDE.md"]);

    let nested = fx.repo.join("ai").join("aipaca.yaml");
    fx.cfg.save(&nested).expect("save nested config");
    let cfg = Config::load(&nested).expect("load nested config");
    let set = discover(&cfg, &fx.store, &fx.repo);
    assert!(set.get("ai").is_none());
    assert!(set.get(".aipaca.yaml").is_some());
}
