//! Compliance run orchestration.
//!
//! One run walks every tenant, every recurring task, and every occurrence
//! scheduled today, classifies each occurrence against recorded state and the
//! current time, and durably records newly-missed occurrences. The service
//! object is constructed with injected dependencies (store, clock,
//! authenticator, progress sink) so runs are deterministic under test.
//!
//! Error policy: authentication and store failures during setup abort the
//! run; a failure inside one tenant is caught, reported through the progress
//! sink, contributes zero to totals, and processing continues with the next
//! tenant.

pub mod classifier;
pub mod keys;
pub mod occurrence;
pub mod recorder;

pub use classifier::{classify, Classification};
pub use recorder::MissedRecorder;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use serde_json::Value;

use crate::auth::Authenticator;
use crate::config::EngineConfig;
use crate::domain::records::DayState;
use crate::domain::tasks::{Recurrence, TaskDefinition};
use crate::error::EngineError;
use crate::progress::ProgressSink;
use crate::store::{paths, DocumentStore, RecordScope};
use crate::timeutil::{date_key, Clock};

/// Fallback display name for tenants without an info document.
const UNNAMED_TENANT: &str = "Unnamed";

/// Which recurrence kinds a pass evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Daily,
    Weekly,
    Monthly,
}

impl Pass {
    fn scope(self) -> RecordScope {
        match self {
            Self::Daily | Self::Weekly => RecordScope::DailyWeekly,
            Self::Monthly => RecordScope::Monthly,
        }
    }

    fn wants(self, recurrence: &Recurrence) -> bool {
        matches!(
            (self, recurrence),
            (Self::Daily, Recurrence::Daily { .. })
                | (Self::Weekly, Recurrence::Weekly { .. })
                | (Self::Monthly, Recurrence::Monthly { .. })
        )
    }
}

/// Outcome of one tenant within a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    /// Tenant id (store key).
    pub tenant_id: String,
    /// Resolved display name, or the `Unnamed` fallback.
    pub name: String,
    /// Newly recorded missed occurrences for this tenant.
    pub missed_recorded: u64,
    /// Whether processing this tenant failed partway.
    pub failed: bool,
}

/// Outcome of one compliance run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Tenants processed without error.
    pub tenants_processed: usize,
    /// Grand total of newly recorded missed occurrences.
    pub missed_recorded: u64,
    /// Per-tenant outcomes in processing order.
    pub tenants: Vec<TenantSummary>,
}

/// The recurring task compliance engine.
pub struct ComplianceEngine {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn Authenticator>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ProgressSink>,
    config: EngineConfig,
}

impl std::fmt::Debug for ComplianceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ComplianceEngine {
    /// Create an engine with injected dependencies.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn Authenticator>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn ProgressSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            auth,
            clock,
            sink,
            config,
        }
    }

    /// Execute one compliance run over all tenants.
    ///
    /// # Errors
    ///
    /// Fails only on authentication failure or store unavailability during
    /// setup; per-tenant failures are contained and reported in the summary.
    pub async fn run(&self) -> Result<RunSummary, EngineError> {
        self.sink.notify("Compliance run starting");

        let identity = match self.auth.authenticate().await {
            Ok(identity) => identity,
            Err(err) => {
                self.sink.notify(&format!("Authentication failed: {err}"));
                return Err(EngineError::Authentication(err));
            }
        };
        self.sink
            .notify(&format!("Authenticated as {}", identity.subject));

        let tenant_ids = self
            .store
            .list(paths::tenants_root())
            .await
            .map_err(EngineError::Store)?;

        if tenant_ids.is_empty() {
            self.sink.notify("No tenants found, nothing to do");
            return Ok(RunSummary::default());
        }

        let mut summary = RunSummary::default();
        for tenant_id in tenant_ids {
            let name = self.tenant_name(&tenant_id).await;
            self.sink
                .notify(&format!("Processing tenant {name} ({tenant_id})"));

            match self.process_tenant(&tenant_id).await {
                Ok(count) => {
                    self.sink.notify(&format!(
                        "Tenant {name}: {count} missed occurrence(s) recorded"
                    ));
                    summary.tenants_processed += 1;
                    summary.missed_recorded += count;
                    summary.tenants.push(TenantSummary {
                        tenant_id,
                        name,
                        missed_recorded: count,
                        failed: false,
                    });
                }
                Err(err) => {
                    tracing::error!(
                        component = "engine",
                        tenant = %tenant_id,
                        error = %err,
                        "Tenant processing failed"
                    );
                    self.sink
                        .notify(&format!("Tenant {name} failed, skipping: {err}"));
                    summary.tenants.push(TenantSummary {
                        tenant_id,
                        name,
                        missed_recorded: 0,
                        failed: true,
                    });
                }
            }
        }

        self.sink.notify(&format!(
            "Compliance run complete: {} missed occurrence(s) recorded across {} tenant(s)",
            summary.missed_recorded, summary.tenants_processed
        ));
        Ok(summary)
    }

    /// Tenant display name, falling back to [`UNNAMED_TENANT`].
    async fn tenant_name(&self, tenant_id: &str) -> String {
        match self.store.get(&paths::tenant_info(tenant_id)).await {
            Ok(Some(info)) => info
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .unwrap_or(UNNAMED_TENANT)
                .to_owned(),
            Ok(None) => UNNAMED_TENANT.to_owned(),
            Err(err) => {
                tracing::warn!(
                    component = "engine",
                    tenant = tenant_id,
                    error = %err,
                    "Tenant name lookup failed"
                );
                UNNAMED_TENANT.to_owned()
            }
        }
    }

    /// Run the daily, weekly, and monthly passes for one tenant.
    async fn process_tenant(&self, tenant_id: &str) -> anyhow::Result<u64> {
        let now = self.clock.now();
        let date = now.date_naive();
        let time = now.time();

        let mut total = 0;
        total += self.run_pass(tenant_id, Pass::Daily, date, time).await?;
        total += self.run_pass(tenant_id, Pass::Weekly, date, time).await?;
        total += self.run_pass(tenant_id, Pass::Monthly, date, time).await?;
        self.list_yearly_plans(tenant_id).await?;
        Ok(total)
    }

    /// Evaluate every task of one recurrence kind for `tenant_id`.
    async fn run_pass(
        &self,
        tenant_id: &str,
        pass: Pass,
        date: NaiveDate,
        time: NaiveTime,
    ) -> anyhow::Result<u64> {
        let scope = pass.scope();
        let collection = paths::task_collection(tenant_id, scope);
        let task_ids = self.store.list(&collection).await?;

        let mut recorded = 0;
        for task_id in task_ids {
            let Some(doc) = self.store.get(&paths::task(tenant_id, scope, &task_id)).await? else {
                continue;
            };
            let Some(task) = TaskDefinition::parse(
                &task_id,
                &doc,
                scope == RecordScope::Monthly,
                self.config.default_tolerance_minutes,
            ) else {
                continue;
            };
            if !pass.wants(&task.recurrence) {
                continue;
            }
            recorded += self
                .evaluate_task(tenant_id, scope, &task, date, time)
                .await?;
        }
        Ok(recorded)
    }

    /// Classify one task for `date` and apply the results.
    async fn evaluate_task(
        &self,
        tenant_id: &str,
        scope: RecordScope,
        task: &TaskDefinition,
        date: NaiveDate,
        time: NaiveTime,
    ) -> anyhow::Result<u64> {
        if !task.status.is_accepted() {
            return Ok(0);
        }
        let occurrences = occurrence::resolve(task, date);
        if occurrences.is_empty() {
            return Ok(0);
        }

        let day = date_key(date);
        let completed_day = self
            .store
            .get(&paths::completed_day(tenant_id, scope, &task.id, &day))
            .await?;
        let missed_day = self
            .store
            .get(&paths::missed_day(tenant_id, scope, &task.id, &day))
            .await?;
        let state = DayState::from_values(completed_day.as_ref(), missed_day.as_ref());

        let classification = classifier::classify(task, &occurrences, &state, time, &self.config);
        if classification.is_empty() {
            return Ok(0);
        }

        // Writes stay ordered per task: misses first, then started-record
        // cleanup, each in ascending occurrence order.
        let recorder = MissedRecorder::new(self.store.as_ref(), self.clock.as_ref());
        for missed_time in &classification.newly_missed {
            recorder
                .record(tenant_id, scope, task, &day, missed_time)
                .await?;
        }
        for expired_time in &classification.expired_started {
            recorder
                .expire_started(tenant_id, scope, &task.id, &day, expired_time)
                .await?;
        }

        self.sink.notify(&format!(
            "Task {}: {} missed, {} expired started record(s)",
            task.name,
            classification.newly_missed.len(),
            classification.expired_started.len()
        ));
        Ok(classification.newly_missed.len() as u64)
    }

    /// Report yearly plans through the sink; they are listed, never
    /// classified per-day.
    async fn list_yearly_plans(&self, tenant_id: &str) -> anyhow::Result<()> {
        let collection = paths::task_collection(tenant_id, RecordScope::DailyWeekly);
        for task_id in self.store.list(&collection).await? {
            let Some(doc) = self
                .store
                .get(&paths::task(tenant_id, RecordScope::DailyWeekly, &task_id))
                .await?
            else {
                continue;
            };
            let Some(task) =
                TaskDefinition::parse(&task_id, &doc, false, self.config.default_tolerance_minutes)
            else {
                continue;
            };
            if let Recurrence::Yearly { planned_date, .. } = &task.recurrence {
                self.sink.notify(&format!(
                    "Yearly task {} planned for {planned_date}",
                    task.name
                ));
            }
        }
        Ok(())
    }
}
