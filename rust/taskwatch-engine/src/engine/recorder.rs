//! Missed-occurrence recording.
//!
//! Persists newly-missed occurrences with a denormalized task/assignee
//! snapshot and removes started records whose deadline has passed. Writes use
//! the deterministic `(taskId, date, time)` key so a retried write replaces
//! itself with identical content; duplicate filtering against existing missed
//! records is the classifier's job, not repeated here.

use crate::domain::records::{display_name, MissedRecord};
use crate::domain::tasks::TaskDefinition;
use crate::store::{paths, DocumentStore, RecordScope};
use crate::timeutil::Clock;

/// Sentinel name for tasks with no assignee.
const UNASSIGNED: &str = "Unassigned";
/// Sentinel name when the assignee cannot be resolved in any registry.
const UNKNOWN: &str = "Unknown";

/// Writes missed records and expires stale started records.
pub struct MissedRecorder<'a> {
    store: &'a dyn DocumentStore,
    clock: &'a dyn Clock,
}

impl std::fmt::Debug for MissedRecorder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissedRecorder").finish_non_exhaustive()
    }
}

impl<'a> MissedRecorder<'a> {
    /// Create a recorder over the given store and clock.
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Record one missed occurrence.
    ///
    /// Resolves the assignee display name first (personnel registry, then the
    /// secondary identity registry, then a sentinel); name-resolution failures
    /// never abort the write itself.
    pub async fn record(
        &self,
        tenant: &str,
        scope: RecordScope,
        task: &TaskDefinition,
        date: &str,
        time: &str,
    ) -> anyhow::Result<()> {
        let assignee_name = self
            .resolve_assignee_name(tenant, task.assignee_id.as_deref())
            .await;

        let record = MissedRecord {
            missed_at: self.clock.now(),
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            task_description: task.description.clone(),
            recurrence: task.recurrence.kind().to_owned(),
            start_tolerance_minutes: task.start_tolerance_minutes,
            assignee_id: task.assignee_id.clone(),
            assignee_name,
        };

        let path = paths::missed_occurrence(tenant, scope, &task.id, date, time);
        self.store
            .set(&path, serde_json::to_value(&record)?)
            .await?;

        tracing::debug!(
            component = "recorder",
            tenant,
            task = %task.id,
            date,
            time,
            "Missed occurrence recorded"
        );
        Ok(())
    }

    /// Delete the started record for an occurrence whose deadline elapsed.
    ///
    /// An already-absent record is not an error.
    pub async fn expire_started(
        &self,
        tenant: &str,
        scope: RecordScope,
        task_id: &str,
        date: &str,
        time: &str,
    ) -> anyhow::Result<()> {
        let path = paths::completed_occurrence(tenant, scope, task_id, date, time);
        self.store.delete(&path).await?;

        tracing::debug!(
            component = "recorder",
            tenant,
            task = task_id,
            date,
            time,
            "Expired started record removed"
        );
        Ok(())
    }

    /// Resolve an assignee's display name, degrading to sentinels.
    async fn resolve_assignee_name(&self, tenant: &str, assignee_id: Option<&str>) -> String {
        let Some(assignee_id) = assignee_id else {
            return UNASSIGNED.to_owned();
        };

        match self.store.get(&paths::personnel(tenant, assignee_id)).await {
            Ok(Some(doc)) => {
                if let Some(name) = display_name(&doc) {
                    return name;
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    component = "recorder",
                    tenant,
                    assignee = assignee_id,
                    error = %err,
                    "Personnel lookup failed"
                );
            }
        }

        match self.store.get(&paths::identity(assignee_id)).await {
            Ok(Some(doc)) => display_name(&doc).unwrap_or_else(|| UNKNOWN.to_owned()),
            Ok(None) => UNKNOWN.to_owned(),
            Err(err) => {
                tracing::warn!(
                    component = "recorder",
                    tenant,
                    assignee = assignee_id,
                    error = %err,
                    "Identity lookup failed"
                );
                UNKNOWN.to_owned()
            }
        }
    }
}
