//! End-to-end tests for app creation, persistence and deferred registration

use cellar_core::{
    App, Context, Error, LocalOnlyRegistry, MemoryRemote, Settings, SyncState, sync_pending,
};
use std::path::Path;
use std::sync::{Arc, Once};
use tempfile::TempDir;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

struct Harness {
    home: TempDir,
    remote: Arc<MemoryRemote>,
    ctx: Arc<Context>,
}

impl Harness {
    fn new(remote: MemoryRemote) -> Self {
        init_tracing();
        let home = TempDir::new().unwrap();
        let remote = Arc::new(remote);
        let ctx = Arc::new(Context::new(
            Settings::default(),
            remote.clone(),
            home.path().join("local_only.json"),
        ));
        Self { home, remote, ctx }
    }

    async fn registry(&self) -> LocalOnlyRegistry {
        LocalOnlyRegistry::open(self.home.path().join("local_only.json"))
            .await
            .unwrap()
    }
}

fn local_only_flag(dir: &Path) -> Option<bool> {
    let raw = std::fs::read_to_string(dir.join("cellar.json")).unwrap();
    let json: serde_json::Value = cellar_core::json_comment::parse(&raw).unwrap();
    json.get("localOnly").and_then(serde_json::Value::as_bool)
}

#[tokio::test]
async fn test_two_creates_get_distinct_ids() {
    let h = Harness::new(MemoryRemote::new());
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let a = App::create(first.path(), Some("a"), h.ctx.clone()).await.unwrap();
    let b = App::create(second.path(), Some("b"), h.ctx.clone()).await.unwrap();

    assert_ne!(a.id(), b.id());
    assert_eq!(h.remote.app_count().await, 2);
}

#[tokio::test]
async fn test_create_over_existing_app_leaves_file_untouched() {
    let h = Harness::new(MemoryRemote::new());
    let dir = TempDir::new().unwrap();
    App::create(dir.path(), Some("billing"), h.ctx.clone())
        .await
        .unwrap();
    let before = std::fs::read(dir.path().join("cellar.json")).unwrap();

    let err = App::create(dir.path(), Some("billing"), h.ctx.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AppExists { .. }));
    assert_eq!(std::fs::read(dir.path().join("cellar.json")).unwrap(), before);
    assert_eq!(h.remote.app_count().await, 1);
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let h = Harness::new(MemoryRemote::new());
    let dir = TempDir::new().unwrap();

    let mut app = App::create(dir.path(), Some("billing"), h.ctx.clone())
        .await
        .unwrap();
    app.find_env("staging").set("DATABASE_URL", "postgres://db").await.unwrap();
    app.find_env("staging").set("PORT", "5432").await.unwrap();
    app.find_env("preview").set("PORT", "9000").await.unwrap();
    app.save().await.unwrap();

    let mut loaded = App::load(dir.path(), h.ctx.clone()).await.unwrap();
    assert_eq!(loaded.id(), app.id());
    assert_eq!(loaded.name(), "billing");
    assert_eq!(loaded.sync_state(), SyncState::Confirmed);

    let names: Vec<_> = loaded.envs().iter().map(|e| e.name().to_string()).collect();
    assert_eq!(names, ["development", "staging", "production", "preview"]);

    let staging = loaded.find_env("staging").values().await.unwrap();
    let pairs: Vec<_> = staging.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(pairs, [("DATABASE_URL", "postgres://db"), ("PORT", "5432")]);
}

#[tokio::test]
async fn test_offline_save_succeeds_and_stays_local_only() {
    let h = Harness::new(MemoryRemote::offline());
    let dir = TempDir::new().unwrap();

    let mut app = App::create(dir.path(), Some("billing"), h.ctx.clone())
        .await
        .unwrap();
    app.save().await.unwrap();

    assert_eq!(app.sync_state(), SyncState::Pending);
    assert_eq!(local_only_flag(dir.path()), Some(true));
    assert!(h.registry().await.contains(app.id()));
    assert_eq!(h.registry().await.len(), 1);
}

#[tokio::test]
async fn test_concurrent_offline_creates_are_all_registered() {
    let h = Harness::new(MemoryRemote::offline());
    for _ in 0..10 {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        let (a, b) = tokio::join!(
            App::create(first.path(), Some("a"), h.ctx.clone()),
            App::create(second.path(), Some("b"), h.ctx.clone()),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let registry = h.registry().await;
        assert!(registry.contains(a.id()));
        assert!(registry.contains(b.id()));
    }
    assert_eq!(h.registry().await.len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_offline_creates_keep_every_entry() {
    let h = Harness::new(MemoryRemote::offline());
    let dirs: Vec<TempDir> = (0..8).map(|_| TempDir::new().unwrap()).collect();

    let tasks: Vec<_> = dirs
        .iter()
        .map(|dir| {
            let dir = dir.path().to_path_buf();
            let ctx = h.ctx.clone();
            tokio::spawn(async move { App::create(&dir, None, ctx).await.map(|app| app.id()) })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().unwrap());
    }

    let registry = h.registry().await;
    assert_eq!(registry.len(), ids.len());
    for id in ids {
        assert!(registry.contains(id));
    }
}

#[tokio::test]
async fn test_reconnect_confirms_and_clears_markers() {
    let h = Harness::new(MemoryRemote::offline());
    let dir = TempDir::new().unwrap();
    let app = App::create(dir.path(), Some("billing"), h.ctx.clone())
        .await
        .unwrap();

    h.remote.set_offline(false);
    let mut loaded = App::load(dir.path(), h.ctx.clone()).await.unwrap();
    assert_eq!(loaded.sync_state(), SyncState::Pending);
    loaded.save().await.unwrap();

    assert!(loaded.is_remote_confirmed());
    assert_eq!(local_only_flag(dir.path()), None);
    assert!(!h.registry().await.contains(app.id()));
    assert!(h.remote.app(&app.remote_id()).await.is_some());
}

#[tokio::test]
async fn test_confirmed_app_never_calls_remote_again() {
    let h = Harness::new(MemoryRemote::new());
    let dir = TempDir::new().unwrap();
    App::create(dir.path(), Some("billing"), h.ctx.clone())
        .await
        .unwrap();
    let calls = h.remote.create_app_calls();

    let mut loaded = App::load(dir.path(), h.ctx.clone()).await.unwrap();
    loaded.save().await.unwrap();
    loaded.save().await.unwrap();

    assert_eq!(h.remote.create_app_calls(), calls);
}

#[tokio::test]
async fn test_find_env_twice_returns_same_env() {
    let h = Harness::new(MemoryRemote::new());
    let dir = TempDir::new().unwrap();
    let mut app = App::create(dir.path(), Some("billing"), h.ctx.clone())
        .await
        .unwrap();

    app.find_env("qa").set("A", "1").await.unwrap();
    let count = app.envs().len();
    let env = app.find_env("qa");
    assert_eq!(env.cells().len(), 1);
    assert_eq!(app.envs().len(), count);
}

#[tokio::test]
async fn test_sweep_is_rerunnable() {
    let h = Harness::new(MemoryRemote::offline());
    let dirs: Vec<TempDir> = (0..3).map(|_| TempDir::new().unwrap()).collect();
    for dir in &dirs {
        App::create(dir.path(), None, h.ctx.clone()).await.unwrap();
    }
    assert_eq!(h.registry().await.len(), 3);

    let report = sync_pending(&h.ctx).await.unwrap();
    assert_eq!(report.still_pending.len(), 3);
    assert_eq!(h.registry().await.len(), 3);

    h.remote.set_offline(false);
    let report = sync_pending(&h.ctx).await.unwrap();
    assert_eq!(report.confirmed.len(), 3);
    assert!(h.registry().await.is_empty());

    let report = sync_pending(&h.ctx).await.unwrap();
    assert_eq!(report.total(), 0);
    assert_eq!(h.remote.app_count().await, 3);
    for dir in &dirs {
        assert_eq!(local_only_flag(dir.path()), None);
    }
}

#[tokio::test]
async fn test_dotfile_export() {
    let h = Harness::new(MemoryRemote::new());
    let dir = TempDir::new().unwrap();
    let mut app = App::create(dir.path(), Some("billing"), h.ctx.clone())
        .await
        .unwrap();
    app.default_env().set("PORT", "8080").await.unwrap();
    app.default_env().set("HOST", "localhost").await.unwrap();

    let rendered = app.default_env().to_dotfile().await.unwrap();
    assert_eq!(rendered, "PORT=8080\nHOST=localhost\n");

    let parsed = cellar_core::dotfile::parse(&rendered).unwrap();
    assert_eq!(parsed.get("HOST").map(String::as_str), Some("localhost"));
}
