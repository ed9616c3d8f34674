use mirrorstack_model::{AuthPersistence, Record, ResourceSpec};
use mirrorstack_sync::{
    AttachmentStore, EngineConfig, FnTransform, MemoryAttachmentStore, MemoryStore, MirrorEngine,
    OperationResult, RemoteStore, SyncError, SyncStatus,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn posts() -> ResourceSpec {
    ResourceSpec::descriptor("posts").public().into()
}

async fn start_with(store: &Arc<MemoryStore>, config: EngineConfig) -> MirrorEngine {
    init_tracing();
    MirrorEngine::builder(Arc::clone(store) as Arc<dyn RemoteStore>)
        .with_config(config)
        .start()
        .await
        .unwrap()
}

async fn start(store: &Arc<MemoryStore>, resources: Vec<ResourceSpec>) -> MirrorEngine {
    start_with(store, EngineConfig::new(resources)).await
}

/// Gives the synchronizers a chance to drain their feeds.
async fn drain() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn record(result: &OperationResult) -> &Record {
    result.record().expect("expected a single record")
}

fn ids(result: &OperationResult) -> Vec<&str> {
    result.records().iter().map(|r| r.id.as_str()).collect()
}

// ── Snapshot & live feed ─────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn get_one_then_removed_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    store.seed("/posts", "a1", json!({"title": "x"})).await;
    let engine = start(&store, vec![posts()]).await;

    let result = engine
        .execute("GET_ONE", "posts", json!({"id": "a1"}))
        .await
        .unwrap();
    assert_eq!(record(&result).to_value(), json!({"id": "a1", "title": "x"}));

    store.remove("/posts", "a1").await;
    drain().await;

    let err = engine
        .execute("GET_ONE", "posts", json!({"id": "a1"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound { ref id, .. } if id == "a1"));
}

#[tokio::test(start_paused = true)]
async fn snapshot_is_complete_when_ready() {
    let store = Arc::new(MemoryStore::new());
    for (id, n) in [("c", 3), ("a", 1), ("b", 2)] {
        store.seed("/posts", id, json!({"n": n})).await;
    }
    let engine = start(&store, vec![posts()]).await;

    let result = engine.execute("GET_LIST", "posts", Value::Null).await.unwrap();
    assert_eq!(ids(&result), vec!["a", "b", "c"]);
    assert_eq!(result.to_json()["total"], json!(3));
}

#[tokio::test(start_paused = true)]
async fn external_changes_reconcile_snapshot_records() {
    let store = Arc::new(MemoryStore::new());
    store.seed("/posts", "a1", json!({"title": "x"})).await;
    let engine = start(&store, vec![posts()]).await;
    engine.readiness("posts").unwrap().wait().await.unwrap();

    store.seed("/posts", "a1", json!({"title": "z"})).await;
    store.seed("/posts", "a0", json!({"title": "new"})).await;
    drain().await;

    let one = engine
        .execute("GET_ONE", "posts", json!({"id": "a1"}))
        .await
        .unwrap();
    assert_eq!(record(&one).get("title"), Some(&json!("z")));

    let list = engine.execute("GET_LIST", "posts", json!({})).await.unwrap();
    assert_eq!(ids(&list), vec!["a0", "a1"]);
}

#[tokio::test(start_paused = true)]
async fn unrelated_events_leave_other_records_alone() {
    let store = Arc::new(MemoryStore::new());
    for id in ["a1", "a2", "a3"] {
        store.seed("/posts", id, json!({"title": id})).await;
    }
    let engine = start(&store, vec![posts()]).await;

    let before = engine.execute("GET_LIST", "posts", json!({})).await.unwrap();
    store.seed("/posts", "a2", json!({"title": "changed"})).await;
    drain().await;
    let after = engine.execute("GET_LIST", "posts", json!({})).await.unwrap();

    assert_eq!(before.records().len(), after.records().len());
    for (old, new) in before.records().iter().zip(after.records()) {
        assert_eq!(old.id, new.id);
        if old.id != "a2" {
            assert_eq!(old, new);
        }
    }
    assert_eq!(after.records()[1].get("title"), Some(&json!("changed")));
}

// ── Readiness gating ─────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn operations_wait_for_snapshot_and_settle_delay() {
    let store = Arc::new(MemoryStore::new());
    for id in ["a", "b", "c"] {
        store.seed("/posts", id, json!({})).await;
    }
    store.set_read_delay(Duration::from_millis(500)).await;

    let started = Instant::now();
    let engine = start(&store, vec![posts()]).await;
    let result = engine.execute("GET_LIST", "posts", json!({})).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(1_500));
    assert_eq!(result.records().len(), 3);
    assert_eq!(engine.status("posts"), Some(SyncStatus::Live));
}

#[tokio::test(start_paused = true)]
async fn readiness_does_not_resolve_before_settle_delay() {
    let store = Arc::new(MemoryStore::new());
    let engine = start(&store, vec![posts()]).await;

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert_eq!(engine.status("posts"), Some(SyncStatus::Settling));

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(engine.status("posts"), Some(SyncStatus::Live));
}

#[tokio::test(start_paused = true)]
async fn private_resource_waits_for_sign_in() {
    let store = Arc::new(MemoryStore::new());
    store.seed("/secrets", "s1", json!({"v": 1})).await;
    let engine = Arc::new(start(&store, vec!["secrets".into()]).await);

    let pending = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.execute("GET_LIST", "secrets", json!({})).await }
    });

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!pending.is_finished());
    assert_eq!(engine.status("secrets"), Some(SyncStatus::SnapshotLoading));

    store.sign_in("user-1");
    let result = pending.await.unwrap().unwrap();
    assert_eq!(ids(&result), vec!["s1"]);
}

#[tokio::test(start_paused = true)]
async fn resources_become_ready_independently() {
    let store = Arc::new(MemoryStore::new());
    let engine = start(&store, vec![posts(), "secrets".into()]).await;

    engine.execute("GET_LIST", "posts", json!({})).await.unwrap();
    assert_eq!(engine.status("posts"), Some(SyncStatus::Live));
    assert_eq!(engine.status("secrets"), Some(SyncStatus::SnapshotLoading));
}

// ── Create & update ──────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn create_then_update_stamps_timestamps() {
    let store = Arc::new(MemoryStore::new());
    let engine = start(&store, vec![posts()]).await;

    let created = engine
        .execute("CREATE", "posts", json!({"data": {"title": "y"}}))
        .await
        .unwrap();
    let created = record(&created).clone();
    assert!(!created.id.is_empty());
    let created_at = created.get("createdAt").cloned().unwrap();
    assert!(created_at.as_str().is_some_and(|s| !s.is_empty()));
    assert!(created.get("updatedAt").is_some());

    drain().await;
    let cached = engine
        .execute("GET_ONE", "posts", json!({"id": created.id}))
        .await
        .unwrap();
    assert_eq!(record(&cached), &created);

    let updated = engine
        .execute(
            "UPDATE",
            "posts",
            json!({"id": created.id, "data": {"title": "z"}}),
        )
        .await
        .unwrap();
    let updated = record(&updated);
    assert_eq!(updated.get("title"), Some(&json!("z")));
    assert_eq!(updated.get("createdAt"), Some(&created_at));
    assert!(updated.get("updatedAt").is_some());

    let stored = store.get("/posts", &created.id).await.unwrap();
    assert_eq!(stored["title"], json!("z"));
    assert_eq!(stored["createdAt"], created_at);

    drain().await;
    let cached = engine
        .execute("GET_ONE", "posts", json!({"id": created.id}))
        .await
        .unwrap();
    assert_eq!(record(&cached), updated);
}

#[tokio::test(start_paused = true)]
async fn create_keeps_caller_supplied_id() {
    let store = Arc::new(MemoryStore::new());
    let engine = start(&store, vec![posts()]).await;

    let created = engine
        .execute("CREATE", "posts", json!({"data": {"id": "custom", "title": "y"}}))
        .await
        .unwrap();
    assert_eq!(record(&created).id, "custom");

    let stored = store.get("/posts", "custom").await.unwrap();
    assert!(stored.get("id").is_none());
}

#[tokio::test(start_paused = true)]
async fn generated_ids_are_unique() {
    let store = Arc::new(MemoryStore::new());
    let engine = start(&store, vec![posts()]).await;

    let mut seen = HashSet::new();
    for n in 0..50 {
        let created = engine
            .execute("CREATE", "posts", json!({"data": {"n": n}}))
            .await
            .unwrap();
        assert!(seen.insert(record(&created).id.clone()));
    }
    assert_eq!(store.records("/posts").await.len(), 50);
}

#[tokio::test(start_paused = true)]
async fn timestamps_can_be_disabled_or_renamed() {
    let store = Arc::new(MemoryStore::new());
    let mut config = EngineConfig::new([posts()]);
    config.timestamp_field_names.created = "created_at".into();
    let engine = start_with(&store, config).await;

    let created = engine
        .execute("CREATE", "posts", json!({"data": {}}))
        .await
        .unwrap();
    assert!(record(&created).get("created_at").is_some());
    assert!(record(&created).get("createdAt").is_none());

    let mut config = EngineConfig::new([ResourceSpec::descriptor("drafts").public()]);
    config.stamp_timestamps = false;
    let engine = start_with(&store, config).await;
    let created = engine
        .execute("CREATE", "drafts", json!({"data": {"title": "t"}}))
        .await
        .unwrap();
    assert_eq!(record(&created).fields.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cache_is_only_updated_by_the_feed() {
    let store = Arc::new(MemoryStore::new());
    let engine = start(&store, vec![posts()]).await;
    engine.readiness("posts").unwrap().wait().await.unwrap();

    let created = engine
        .execute("CREATE", "posts", json!({"data": {"title": "y"}}))
        .await
        .unwrap();
    let id = record(&created).id.clone();

    // Nothing yielded to the synchronizer yet.
    let err = engine
        .execute("GET_ONE", "posts", json!({"id": id}))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound { .. }));

    drain().await;
    assert!(engine
        .execute("GET_ONE", "posts", json!({"id": id}))
        .await
        .is_ok());
}

#[tokio::test(start_paused = true)]
async fn transform_hooks_wrap_the_cache() {
    let store = Arc::new(MemoryStore::new());
    store.seed("/posts", "a1", json!({"title": "x"})).await;

    let transform = FnTransform::new()
        .with_post_read(|raw, id, resource| {
            let mut record = Record::from_raw(id, raw);
            record.set("resource", json!(resource));
            record
        })
        .with_pre_save(|mut record, _| {
            record.fields.remove("resource");
            record
        });

    init_tracing();
    let engine = MirrorEngine::builder(Arc::clone(&store) as Arc<dyn RemoteStore>)
        .with_config(EngineConfig::new([posts()]))
        .with_transform(Arc::new(transform))
        .start()
        .await
        .unwrap();

    let one = engine
        .execute("GET_ONE", "posts", json!({"id": "a1"}))
        .await
        .unwrap();
    assert_eq!(record(&one).get("resource"), Some(&json!("posts")));

    engine
        .execute(
            "UPDATE",
            "posts",
            json!({"id": "a1", "data": {"title": "y", "resource": "posts"}}),
        )
        .await
        .unwrap();
    let stored = store.get("/posts", "a1").await.unwrap();
    assert!(stored.get("resource").is_none());
    assert_eq!(stored["title"], json!("y"));
}

// ── Delete & bulk operations ─────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn delete_is_eventual() {
    let store = Arc::new(MemoryStore::new());
    store.seed("/posts", "a1", json!({"title": "x"})).await;
    let engine = start(&store, vec![posts()]).await;

    let result = engine
        .execute("DELETE", "posts", json!({"id": "a1"}))
        .await
        .unwrap();
    assert_eq!(result.to_json(), json!({"data": {"id": "a1"}}));
    assert!(store.get("/posts", "a1").await.is_none());

    drain().await;
    let list = engine.execute("GET_LIST", "posts", json!({})).await.unwrap();
    assert!(list.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn bulk_mutations() {
    let store = Arc::new(MemoryStore::new());
    for id in ["a", "b", "c"] {
        store.seed("/posts", id, json!({"published": false})).await;
    }
    let engine = start(&store, vec![posts()]).await;

    let result = engine
        .execute(
            "UPDATE_MANY",
            "posts",
            json!({"ids": ["a", "b"], "data": {"published": true}}),
        )
        .await
        .unwrap();
    assert_eq!(result.to_json(), json!({"data": ["a", "b"]}));
    assert_eq!(store.get("/posts", "a").await.unwrap()["published"], json!(true));
    assert_eq!(store.get("/posts", "c").await.unwrap()["published"], json!(false));

    let result = engine
        .execute("DELETE_MANY", "posts", json!({"ids": ["a", "c"]}))
        .await
        .unwrap();
    assert_eq!(result, OperationResult::Ids(vec!["a".into(), "c".into()]));
    let remaining: Vec<String> = store.records("/posts").await.into_keys().collect();
    assert_eq!(remaining, vec!["b".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn update_many_stops_at_first_failure() {
    let store = Arc::new(MemoryStore::new());
    for id in ["a", "b", "c"] {
        store.seed("/posts", id, json!({"published": false})).await;
    }
    let engine = start(&store, vec![posts()]).await;
    store.reject_writes_to("b").await;

    let err = engine
        .execute(
            "UPDATE_MANY",
            "posts",
            json!({"ids": ["a", "b", "c"], "data": {"published": true}}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Upstream(_)));

    assert_eq!(store.get("/posts", "a").await.unwrap()["published"], json!(true));
    assert_eq!(store.get("/posts", "b").await.unwrap()["published"], json!(false));
    assert_eq!(store.get("/posts", "c").await.unwrap()["published"], json!(false));
}

// ── List family ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn get_list_sorts_and_paginates() {
    let store = Arc::new(MemoryStore::new());
    for (id, views) in [("a", 5), ("b", 9), ("c", 1), ("d", 7)] {
        store.seed("/posts", id, json!({"views": views})).await;
    }
    let engine = start(&store, vec![posts()]).await;

    let result = engine
        .execute(
            "getList",
            "posts",
            json!({
                "pagination": {"page": 1, "perPage": 2},
                "sort": {"field": "views", "order": "DESC"},
                "filter": {}
            }),
        )
        .await
        .unwrap();
    assert_eq!(ids(&result), vec!["b", "d"]);
    assert_eq!(result.to_json()["total"], json!(4));
}

#[tokio::test(start_paused = true)]
async fn get_many_follows_requested_order() {
    let store = Arc::new(MemoryStore::new());
    for id in ["a", "b", "c"] {
        store.seed("/posts", id, json!({})).await;
    }
    let engine = start(&store, vec![posts()]).await;

    let result = engine
        .execute("GET_MANY", "posts", json!({"ids": ["c", "missing", "a"]}))
        .await
        .unwrap();
    assert_eq!(ids(&result), vec!["c", "a"]);
    assert_eq!(result.to_json()["total"], json!(2));
}

#[tokio::test(start_paused = true)]
async fn get_many_reference_filters_on_target() {
    let store = Arc::new(MemoryStore::new());
    store.seed("/comments", "c1", json!({"post_id": "p1"})).await;
    store.seed("/comments", "c2", json!({"post_id": "p2"})).await;
    store.seed("/comments", "c3", json!({"post_id": "p1"})).await;
    let engine = start(
        &store,
        vec![ResourceSpec::descriptor("comments").public().into()],
    )
    .await;

    let result = engine
        .execute(
            "GET_MANY_REFERENCE",
            "comments",
            json!({"target": "post_id", "id": "p1", "sort": {"field": "id", "order": "DESC"}}),
        )
        .await
        .unwrap();
    assert_eq!(ids(&result), vec!["c3", "c1"]);
}

// ── Attachments ──────────────────────────────────────────────────

async fn start_with_attachments(
    store: &Arc<MemoryStore>,
    attachments: &Arc<MemoryAttachmentStore>,
) -> MirrorEngine {
    init_tracing();
    let resource = ResourceSpec::descriptor("posts")
        .public()
        .with_attachments(["cover"]);
    MirrorEngine::builder(Arc::clone(store) as Arc<dyn RemoteStore>)
        .with_config(EngineConfig::new([resource]))
        .with_attachments(Arc::clone(attachments) as Arc<dyn AttachmentStore>)
        .start()
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn attachments_are_uploaded_before_save_and_deleted_with_record() {
    let store = Arc::new(MemoryStore::new());
    let attachments = Arc::new(MemoryAttachmentStore::new());
    let engine = start_with_attachments(&store, &attachments).await;

    let created = engine
        .execute(
            "CREATE",
            "posts",
            json!({"data": {"title": "y", "cover": {"rawFile": "AAAA", "title": "c.png"}}}),
        )
        .await
        .unwrap();
    let created = record(&created).clone();
    let path = format!("/posts/{}/cover", created.id);
    let reference = json!({"src": format!("memory://{path}"), "title": "c.png"});

    assert_eq!(created.get("cover"), Some(&reference));
    assert_eq!(store.get("/posts", &created.id).await.unwrap()["cover"], reference);
    assert_eq!(attachments.stored().await.get(&path), Some(&json!("AAAA")));

    engine
        .execute("DELETE", "posts", json!({"id": created.id}))
        .await
        .unwrap();
    assert_eq!(attachments.deleted().await, vec![path]);
}

#[tokio::test(start_paused = true)]
async fn existing_references_pass_through() {
    let store = Arc::new(MemoryStore::new());
    let attachments = Arc::new(MemoryAttachmentStore::new());
    let engine = start_with_attachments(&store, &attachments).await;

    let cover = json!({"src": "https://cdn.example/x.png", "title": "x"});
    let created = engine
        .execute("CREATE", "posts", json!({"data": {"cover": cover}}))
        .await
        .unwrap();
    assert_eq!(record(&created).get("cover"), Some(&cover));
    assert!(attachments.stored().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_upload_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let attachments = Arc::new(MemoryAttachmentStore::new());
    attachments.fail_uploads(true);
    let engine = start_with_attachments(&store, &attachments).await;

    let err = engine
        .execute(
            "CREATE",
            "posts",
            json!({"data": {"title": "y", "cover": {"rawFile": "AAAA"}}}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Upstream(_)));
    assert!(store.records("/posts").await.is_empty());
}

// ── Errors ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn unrecognized_kind_returns_empty_data() {
    let store = Arc::new(MemoryStore::new());
    store.seed("/posts", "a1", json!({})).await;
    let engine = start(&store, vec![posts()]).await;

    let result = engine.execute("FOO", "posts", json!({})).await.unwrap();
    assert_eq!(result, OperationResult::Empty);
    assert_eq!(result.to_json(), json!({"data": []}));
}

#[tokio::test(start_paused = true)]
async fn unknown_resource_fails_fast() {
    let store = Arc::new(MemoryStore::new());
    let engine = start(&store, vec![posts()]).await;

    let err = engine
        .execute("GET_LIST", "users", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::UnknownResource(name) if name == "users"));
}

#[tokio::test(start_paused = true)]
async fn bad_params_are_rejected() {
    let store = Arc::new(MemoryStore::new());
    let engine = start(&store, vec![posts()]).await;

    let err = engine
        .execute("GET_ONE", "posts", json!({"title": "no id"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidParams(_)));
}

#[tokio::test(start_paused = true)]
async fn remote_write_failure_surfaces_upstream() {
    let store = Arc::new(MemoryStore::new());
    let engine = start(&store, vec![posts()]).await;
    store.fail_writes(true);

    let err = engine
        .execute("CREATE", "posts", json!({"data": {"title": "y"}}))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Upstream(_)));

    let err = engine
        .execute("DELETE", "posts", json!({"id": "a1"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Upstream(_)));
}

#[tokio::test(start_paused = true)]
async fn snapshot_failure_rejects_waiters() {
    let store = Arc::new(MemoryStore::new());
    store.fail_reads(true);
    let engine = start(&store, vec![posts()]).await;

    let err = engine
        .execute("GET_LIST", "posts", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Upstream(_)));
    assert!(matches!(engine.status("posts"), Some(SyncStatus::Failed(_))));
}

// ── Lifecycle ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn nameless_or_duplicate_resources_fail_startup() {
    let store = Arc::new(MemoryStore::new());

    let config = EngineConfig::from_json(r#"{"trackedResources": [{"path": "/x"}]}"#).unwrap();
    let err = MirrorEngine::builder(Arc::clone(&store) as Arc<dyn RemoteStore>)
        .with_config(config)
        .start()
        .await
        .err()
        .unwrap();
    assert!(matches!(err, SyncError::InvalidResource(_)));

    let config = EngineConfig::new(["posts", "posts"]);
    let err = MirrorEngine::builder(Arc::clone(&store) as Arc<dyn RemoteStore>)
        .with_config(config)
        .start()
        .await
        .err()
        .unwrap();
    assert!(matches!(err, SyncError::InvalidResource(_)));
    assert_eq!(store.subscriber_count("/posts").await, 0);
}

#[tokio::test(start_paused = true)]
async fn startup_applies_config() {
    let store = Arc::new(MemoryStore::new());
    let config = EngineConfig::from_json(
        r#"{
            "trackedResources": ["users", {"name": "posts", "path": "/blog/posts", "isPublic": true}],
            "authPersistence": "session",
            "initialReadinessSettleDelayMs": 50
        }"#,
    )
    .unwrap();
    store.seed("/blog/posts", "p1", json!({"title": "x"})).await;
    let engine = start_with(&store, config).await;

    assert_eq!(store.persistence().await, AuthPersistence::Session);
    let names: Vec<String> = engine.resources().iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["users", "posts"]);

    let started = Instant::now();
    let result = engine.execute("GET_LIST", "posts", json!({})).await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(ids(&result), vec!["p1"]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_rejects_new_and_waiting_operations() {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(start(&store, vec![posts(), "secrets".into()]).await);
    engine.execute("GET_LIST", "posts", json!({})).await.unwrap();

    let waiting = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.execute("GET_LIST", "secrets", json!({})).await }
    });
    drain().await;

    engine.shutdown();
    assert!(engine.is_shut_down());
    assert!(matches!(
        waiting.await.unwrap(),
        Err(SyncError::ChannelClosed)
    ));
    assert!(matches!(
        engine.execute("GET_LIST", "posts", json!({})).await,
        Err(SyncError::ChannelClosed)
    ));
}
