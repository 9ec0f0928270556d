//! Recurring task definitions.
//!
//! Task documents are written by the tracker UI in camelCase JSON. The engine
//! parses them leniently: a document that cannot be understood is simply not
//! evaluated, matching the "silently ignored" tier of the error policy.

use chrono::Weekday;
use serde_json::{Map, Value};

/// Workflow status of a task definition.
///
/// Only `accepted` tasks are evaluated for compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Approved for execution; evaluated by the engine.
    Accepted,
    /// Awaiting approval.
    Pending,
    /// Rejected by a manager.
    Declined,
    /// Removed from rotation but kept for history.
    Archived,
}

impl TaskStatus {
    /// Parse a status string; anything unrecognized is treated as pending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            "archived" => Self::Archived,
            _ => Self::Pending,
        }
    }

    /// Status string as stored.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Pending => "pending",
            Self::Declined => "declined",
            Self::Archived => "archived",
        }
    }

    /// Whether the engine evaluates tasks in this status.
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Recurrence pattern of a task, with kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Recurrence {
    /// Repeats every day at the listed times.
    Daily {
        /// Times of day, `HH:MM`. Logically unordered in storage.
        times: Vec<String>,
    },
    /// Repeats on specific weekdays at the listed times.
    Weekly {
        /// Times of day, `HH:MM`.
        times: Vec<String>,
        /// Lowercase weekday names the task is scheduled on.
        weekdays: Vec<String>,
    },
    /// Month/day-indexed plan. Keys are kept raw because their textual
    /// encoding (padded vs unpadded, 0- vs 1-based) varies per tenant and is
    /// resolved at read time.
    Monthly {
        /// Raw `month*` sub-containers.
        months: Map<String, Value>,
    },
    /// A single planned date; listed but never classified per-day.
    Yearly {
        /// Planned date, free-form.
        planned_date: String,
        /// Free-text plan details.
        plan_details: String,
    },
}

impl Recurrence {
    /// Kind string as stored in task documents and missed-record snapshots.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Daily { .. } => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Monthly { .. } => "monthly",
            Self::Yearly { .. } => "yearly",
        }
    }
}

/// Lowercase weekday name matching task documents.
#[must_use]
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// A recurring task definition owned by a tenant.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    /// Task id (the store key).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Workflow status; only accepted tasks are evaluated.
    pub status: TaskStatus,
    /// Assigned staff member, when any.
    pub assignee_id: Option<String>,
    /// Grace period after an occurrence's nominal time, in minutes.
    pub start_tolerance_minutes: i64,
    /// Recurrence pattern.
    pub recurrence: Recurrence,
}

impl TaskDefinition {
    /// Parse a task document.
    ///
    /// `monthly_container` marks documents from the `monthlyTasks` collection,
    /// whose recurrence is implied by the collection rather than a field.
    /// `default_tolerance_minutes` applies when the document omits
    /// `startToleranceMinutes`. Returns `None` when the document is not an
    /// object or its recurrence cannot be determined.
    #[must_use]
    pub fn parse(
        id: &str,
        value: &Value,
        monthly_container: bool,
        default_tolerance_minutes: i64,
    ) -> Option<Self> {
        let doc = value.as_object()?;

        let kind = if monthly_container {
            "monthly"
        } else {
            doc.get("recurrence")?.as_str()?
        };

        let recurrence = match kind {
            "daily" => Recurrence::Daily {
                times: string_array(doc.get("repetitionTimes")),
            },
            "weekly" => Recurrence::Weekly {
                times: string_array(doc.get("repetitionTimes")),
                weekdays: string_array(doc.get("weekdays"))
                    .into_iter()
                    .map(|day| day.to_lowercase())
                    .collect(),
            },
            "monthly" => Recurrence::Monthly {
                months: doc
                    .iter()
                    .filter(|(key, _)| key.starts_with("month"))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            },
            "yearly" => Recurrence::Yearly {
                planned_date: str_field(doc, "plannedDate"),
                plan_details: str_field(doc, "planDetails"),
            },
            _ => return None,
        };

        Some(Self {
            id: id.to_owned(),
            name: str_field(doc, "name"),
            description: str_field(doc, "description"),
            status: TaskStatus::parse(&str_field(doc, "status")),
            assignee_id: doc
                .get("assigneeId")
                .and_then(Value::as_str)
                .map(str::to_owned),
            start_tolerance_minutes: doc
                .get("startToleranceMinutes")
                .and_then(Value::as_i64)
                .unwrap_or(default_tolerance_minutes),
            recurrence,
        })
    }
}

fn str_field(doc: &Map<String, Value>, key: &str) -> String {
    doc.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
