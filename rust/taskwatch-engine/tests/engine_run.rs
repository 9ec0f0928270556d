//! End-to-end compliance runs against the in-memory store with a fixed clock.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use taskwatch_engine::auth::SharedSecretAuth;
use taskwatch_engine::config::EngineConfig;
use taskwatch_engine::engine::ComplianceEngine;
use taskwatch_engine::progress::{MemorySink, ProgressSink};
use taskwatch_engine::store::{DocumentStore, MemoryStore};
use taskwatch_engine::timeutil::FixedClock;

/// 2024-03-05 is a Tuesday.
fn clock_at(time: &str) -> FixedClock {
    let instant: DateTime<Utc> = format!("2024-03-05T{time}:00Z").parse().unwrap();
    FixedClock(instant)
}

fn engine_with(
    store: Arc<dyn DocumentStore>,
    clock: FixedClock,
) -> (ComplianceEngine, Arc<MemorySink>) {
    engine_with_config(store, clock, EngineConfig::default())
}

fn engine_with_config(
    store: Arc<dyn DocumentStore>,
    clock: FixedClock,
    config: EngineConfig,
) -> (ComplianceEngine, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let engine = ComplianceEngine::new(
        store,
        Arc::new(SharedSecretAuth::new(Some("secret".into()), "job-runner")),
        Arc::new(clock),
        Arc::clone(&sink) as Arc<dyn ProgressSink>,
        config,
    );
    (engine, sink)
}

async fn seed_daily_task(store: &MemoryStore, tenant: &str, task_id: &str, times: &[&str]) {
    store
        .set(
            &format!("tenants/{tenant}/tasks/{task_id}"),
            json!({
                "name": format!("task {task_id}"),
                "description": "daily duty",
                "status": "accepted",
                "recurrence": "daily",
                "repetitionTimes": times,
            }),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn records_missed_morning_occurrence() {
    let store = MemoryStore::new();
    store
        .set("tenants/acme/info", json!({ "name": "Acme" }))
        .await
        .unwrap();
    seed_daily_task(&store, "acme", "t1", &["08:00", "14:00"]).await;

    let (engine, sink) = engine_with(Arc::new(store.clone()), clock_at("08:20"));
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.tenants_processed, 1);
    assert_eq!(summary.missed_recorded, 1);

    let record = store
        .get("tenants/acme/missedTasks/t1/2024-03-05/08:00")
        .await
        .unwrap()
        .expect("missed record should exist");
    assert_eq!(record["taskName"], "task t1");
    assert_eq!(record["assigneeName"], "Unassigned");

    // The afternoon occurrence is still in the future.
    assert!(store
        .get("tenants/acme/missedTasks/t1/2024-03-05/14:00")
        .await
        .unwrap()
        .is_none());

    let log = sink.messages().join("\n");
    assert!(log.contains("Processing tenant Acme (acme)"));
    assert!(log.contains("1 missed occurrence(s) recorded"));
}

#[tokio::test]
async fn second_run_records_nothing_new() {
    let store = MemoryStore::new();
    seed_daily_task(&store, "acme", "t1", &["08:00"]).await;

    let (engine, _) = engine_with(Arc::new(store.clone()), clock_at("08:20"));
    let first = engine.run().await.unwrap();
    assert_eq!(first.missed_recorded, 1);
    let snapshot_after_first = store.snapshot().await;

    let (engine, _) = engine_with(Arc::new(store.clone()), clock_at("08:20"));
    let second = engine.run().await.unwrap();
    assert_eq!(second.missed_recorded, 0);
    assert_eq!(store.snapshot().await, snapshot_after_first);
}

#[tokio::test]
async fn configured_default_tolerance_governs_tasks_without_their_own() {
    let store = MemoryStore::new();
    // No startToleranceMinutes on the task; the deployment default applies.
    seed_daily_task(&store, "acme", "t1", &["09:00"]).await;

    let config = EngineConfig {
        default_tolerance_minutes: 30,
        ..EngineConfig::default()
    };

    // 09:20 is inside the configured 30-minute grace period.
    let (engine, _) = engine_with_config(Arc::new(store.clone()), clock_at("09:20"), config);
    let summary = engine.run().await.unwrap();
    assert_eq!(summary.missed_recorded, 0);
    assert!(store
        .get("tenants/acme/missedTasks/t1/2024-03-05/09:00")
        .await
        .unwrap()
        .is_none());

    let (engine, _) = engine_with_config(Arc::new(store.clone()), clock_at("09:31"), config);
    let summary = engine.run().await.unwrap();
    assert_eq!(summary.missed_recorded, 1);
}

#[tokio::test]
async fn completed_occurrence_is_never_missed() {
    let store = MemoryStore::new();
    seed_daily_task(&store, "acme", "t1", &["08:00"]).await;
    store
        .set(
            "tenants/acme/completedTasks/t1/2024-03-05/08:00",
            json!({
                "startedAt": "2024-03-05T08:01:00Z",
                "completedAt": "2024-03-05T08:09:00Z",
            }),
        )
        .await
        .unwrap();

    let (engine, _) = engine_with(Arc::new(store.clone()), clock_at("23:30"));
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.missed_recorded, 0);
    assert!(store
        .get("tenants/acme/missedTasks/t1/2024-03-05/08:00")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn expired_started_record_is_missed_and_deleted() {
    let store = MemoryStore::new();
    seed_daily_task(&store, "acme", "t1", &["09:00", "12:00"]).await;
    store
        .set(
            "tenants/acme/completedTasks/t1/2024-03-05/09:00",
            json!({ "startedAt": "2024-03-05T09:02:00Z" }),
        )
        .await
        .unwrap();

    // Deadline is 12:00 minus the 15-minute tolerance; 11:44 is inside it.
    let (engine, _) = engine_with(Arc::new(store.clone()), clock_at("11:44"));
    let summary = engine.run().await.unwrap();
    assert_eq!(summary.missed_recorded, 0);
    assert!(store
        .get("tenants/acme/completedTasks/t1/2024-03-05/09:00")
        .await
        .unwrap()
        .is_some());

    let (engine, _) = engine_with(Arc::new(store.clone()), clock_at("11:46"));
    let summary = engine.run().await.unwrap();
    assert_eq!(summary.missed_recorded, 1);
    assert!(store
        .get("tenants/acme/missedTasks/t1/2024-03-05/09:00")
        .await
        .unwrap()
        .is_some());
    assert!(store
        .get("tenants/acme/completedTasks/t1/2024-03-05/09:00")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn weekly_task_gated_by_weekday() {
    let store = MemoryStore::new();
    store
        .set(
            "tenants/acme/tasks/w1",
            json!({
                "name": "stock check",
                "status": "accepted",
                "recurrence": "weekly",
                "repetitionTimes": ["09:00"],
                "weekdays": ["tuesday"],
            }),
        )
        .await
        .unwrap();
    store
        .set(
            "tenants/acme/tasks/w2",
            json!({
                "name": "deliveries",
                "status": "accepted",
                "recurrence": "weekly",
                "repetitionTimes": ["09:00"],
                "weekdays": ["friday"],
            }),
        )
        .await
        .unwrap();

    let (engine, _) = engine_with(Arc::new(store.clone()), clock_at("10:00"));
    let summary = engine.run().await.unwrap();

    // Only the Tuesday task is scheduled today.
    assert_eq!(summary.missed_recorded, 1);
    assert!(store
        .get("tenants/acme/missedTasks/w1/2024-03-05/09:00")
        .await
        .unwrap()
        .is_some());
    assert!(store
        .get("tenants/acme/missedTasks/w2/2024-03-05/09:00")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn monthly_tasks_resolve_padded_and_unpadded_keys() {
    let store = MemoryStore::new();
    store
        .set(
            "tenants/acme/monthlyTasks/m1",
            json!({
                "name": "deep clean",
                "status": "accepted",
                "month03": { "day05": { "dailyRepetitions": 1, "repetitionTimes": ["07:00"] } },
            }),
        )
        .await
        .unwrap();
    store
        .set(
            "tenants/acme/monthlyTasks/m2",
            json!({
                "name": "filter swap",
                "status": "accepted",
                "month3": { "day5": { "repetitionTimes": ["07:30"] } },
            }),
        )
        .await
        .unwrap();
    store
        .set(
            "tenants/acme/monthlyTasks/m3",
            json!({
                "name": "not this month",
                "status": "accepted",
                "month11": { "day05": { "repetitionTimes": ["07:00"] } },
            }),
        )
        .await
        .unwrap();

    let (engine, _) = engine_with(Arc::new(store.clone()), clock_at("09:00"));
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.missed_recorded, 2);
    assert!(store
        .get("tenants/acme/missedMonthlyTasks/m1/2024-03-05/07:00")
        .await
        .unwrap()
        .is_some());
    assert!(store
        .get("tenants/acme/missedMonthlyTasks/m2/2024-03-05/07:30")
        .await
        .unwrap()
        .is_some());
    assert!(store
        .list("tenants/acme/missedMonthlyTasks/m3")
        .await
        .unwrap()
        .is_empty());
}

/// Store wrapper that fails every operation touching a marker substring,
/// simulating corrupt data for one tenant.
#[derive(Debug, Clone)]
struct FaultyStore {
    inner: MemoryStore,
    poisoned: String,
}

impl FaultyStore {
    fn check(&self, path: &str) -> anyhow::Result<()> {
        if path.contains(&self.poisoned) {
            anyhow::bail!("simulated store failure at {path}");
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Value>> {
        self.check(path)?;
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, value: Value) -> anyhow::Result<()> {
        self.check(path)?;
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> anyhow::Result<()> {
        self.check(path)?;
        self.inner.update(path, fields).await
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.check(path)?;
        self.inner.delete(path).await
    }

    async fn list(&self, path: &str) -> anyhow::Result<Vec<String>> {
        self.check(path)?;
        self.inner.list(path).await
    }
}

#[tokio::test]
async fn tenant_failure_does_not_stop_other_tenants() {
    let inner = MemoryStore::new();
    seed_daily_task(&inner, "alpha", "t1", &["08:00"]).await;
    seed_daily_task(&inner, "beta", "t1", &["08:00"]).await;

    let store = FaultyStore {
        inner: inner.clone(),
        poisoned: "alpha/tasks".to_owned(),
    };

    let (engine, sink) = engine_with(Arc::new(store), clock_at("08:20"));
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.tenants_processed, 1);
    assert_eq!(summary.missed_recorded, 1);
    let alpha = summary.tenants.iter().find(|t| t.tenant_id == "alpha").unwrap();
    assert!(alpha.failed);
    assert_eq!(alpha.missed_recorded, 0);

    assert!(inner
        .get("tenants/beta/missedTasks/t1/2024-03-05/08:00")
        .await
        .unwrap()
        .is_some());
    assert!(sink
        .messages()
        .iter()
        .any(|m| m.contains("failed, skipping")));
}

#[tokio::test]
async fn authentication_failure_aborts_run() {
    let store = MemoryStore::new();
    seed_daily_task(&store, "acme", "t1", &["08:00"]).await;

    let sink = Arc::new(MemorySink::new());
    let engine = ComplianceEngine::new(
        Arc::new(store.clone()),
        Arc::new(SharedSecretAuth::new(None, "job-runner")),
        Arc::new(clock_at("08:20")),
        Arc::clone(&sink) as Arc<dyn ProgressSink>,
        EngineConfig::default(),
    );

    assert!(engine.run().await.is_err());
    // No tenant was touched.
    assert!(store
        .get("tenants/acme/missedTasks/t1/2024-03-05/08:00")
        .await
        .unwrap()
        .is_none());
    assert!(sink
        .messages()
        .iter()
        .any(|m| m.contains("Authentication failed")));
}

#[tokio::test]
async fn empty_store_is_a_noop_success() {
    let (engine, sink) = engine_with(Arc::new(MemoryStore::new()), clock_at("08:20"));
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.tenants_processed, 0);
    assert_eq!(summary.missed_recorded, 0);
    assert!(sink.messages().iter().any(|m| m.contains("No tenants")));
}

#[tokio::test]
async fn unnamed_tenant_uses_fallback_name() {
    let store = MemoryStore::new();
    seed_daily_task(&store, "ghost", "t1", &["08:00"]).await;

    let (engine, sink) = engine_with(Arc::new(store), clock_at("07:00"));
    engine.run().await.unwrap();

    assert!(sink
        .messages()
        .iter()
        .any(|m| m.contains("Processing tenant Unnamed (ghost)")));
}

#[tokio::test]
async fn non_accepted_tasks_are_skipped() {
    let store = MemoryStore::new();
    store
        .set(
            "tenants/acme/tasks/t1",
            json!({
                "name": "pending task",
                "status": "pending",
                "recurrence": "daily",
                "repetitionTimes": ["08:00"],
            }),
        )
        .await
        .unwrap();

    let (engine, _) = engine_with(Arc::new(store.clone()), clock_at("23:00"));
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.missed_recorded, 0);
    assert!(store
        .list("tenants/acme/missedTasks")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn yearly_tasks_are_listed_not_classified() {
    let store = MemoryStore::new();
    store
        .set(
            "tenants/acme/tasks/y1",
            json!({
                "name": "inventory",
                "status": "accepted",
                "recurrence": "yearly",
                "plannedDate": "2024-06-01",
                "planDetails": "full stock count",
            }),
        )
        .await
        .unwrap();

    let (engine, sink) = engine_with(Arc::new(store.clone()), clock_at("23:00"));
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.missed_recorded, 0);
    assert!(store
        .list("tenants/acme/missedTasks")
        .await
        .unwrap()
        .is_empty());
    assert!(sink
        .messages()
        .iter()
        .any(|m| m.contains("Yearly task inventory planned for 2024-06-01")));
}
