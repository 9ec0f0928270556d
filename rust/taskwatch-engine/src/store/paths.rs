//! Store path construction.
//!
//! Keeps every path the engine reads or writes in one place so the store
//! layout stays consistent between the resolver, recorder, and orchestrator.

/// Which occurrence-record collections a task lives in.
///
/// Daily and weekly tasks share the `tasks` / `completedTasks` /
/// `missedTasks` collections; monthly tasks use the `Monthly` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    /// Daily and weekly task collections.
    DailyWeekly,
    /// Monthly task collections.
    Monthly,
}

impl RecordScope {
    /// Collection holding task definitions for this scope.
    #[must_use]
    pub fn task_collection(self) -> &'static str {
        match self {
            Self::DailyWeekly => "tasks",
            Self::Monthly => "monthlyTasks",
        }
    }

    /// Collection holding started/completed occurrence records.
    #[must_use]
    pub fn completed_collection(self) -> &'static str {
        match self {
            Self::DailyWeekly => "completedTasks",
            Self::Monthly => "completedMonthlyTasks",
        }
    }

    /// Collection holding missed occurrence records.
    #[must_use]
    pub fn missed_collection(self) -> &'static str {
        match self {
            Self::DailyWeekly => "missedTasks",
            Self::Monthly => "missedMonthlyTasks",
        }
    }
}

/// Root container listing all tenants.
#[must_use]
pub fn tenants_root() -> &'static str {
    "tenants"
}

/// Tenant display-name document.
#[must_use]
pub fn tenant_info(tenant: &str) -> String {
    format!("tenants/{tenant}/info")
}

/// Task-definition container for one scope.
#[must_use]
pub fn task_collection(tenant: &str, scope: RecordScope) -> String {
    format!("tenants/{tenant}/{}", scope.task_collection())
}

/// One task definition.
#[must_use]
pub fn task(tenant: &str, scope: RecordScope, task_id: &str) -> String {
    format!("tenants/{tenant}/{}/{task_id}", scope.task_collection())
}

/// Started/completed records for one task and calendar day.
#[must_use]
pub fn completed_day(tenant: &str, scope: RecordScope, task_id: &str, date: &str) -> String {
    format!(
        "tenants/{tenant}/{}/{task_id}/{date}",
        scope.completed_collection()
    )
}

/// Missed records for one task and calendar day.
#[must_use]
pub fn missed_day(tenant: &str, scope: RecordScope, task_id: &str, date: &str) -> String {
    format!(
        "tenants/{tenant}/{}/{task_id}/{date}",
        scope.missed_collection()
    )
}

/// One started/completed occurrence record.
#[must_use]
pub fn completed_occurrence(
    tenant: &str,
    scope: RecordScope,
    task_id: &str,
    date: &str,
    time: &str,
) -> String {
    format!("{}/{time}", completed_day(tenant, scope, task_id, date))
}

/// One missed occurrence record.
#[must_use]
pub fn missed_occurrence(
    tenant: &str,
    scope: RecordScope,
    task_id: &str,
    date: &str,
    time: &str,
) -> String {
    format!("{}/{time}", missed_day(tenant, scope, task_id, date))
}

/// Tenant-scoped personnel document used for assignee name resolution.
#[must_use]
pub fn personnel(tenant: &str, person_id: &str) -> String {
    format!("tenants/{tenant}/personnel/{person_id}")
}

/// Secondary identity registry, not tenant-scoped.
#[must_use]
pub fn identity(person_id: &str) -> String {
    format!("identities/{person_id}")
}
