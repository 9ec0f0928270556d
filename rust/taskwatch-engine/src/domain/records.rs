//! Occurrence records and per-day completion state.
//!
//! A record lives at `(taskId, calendarDate, timeString)` and exists in one
//! of three shapes: *completed* (`startedAt` + `completedAt`), *started*
//! (`startedAt` only), or *missed* (`missedAt` plus a denormalized snapshot).
//! Started/completed records are written by the completion UI; the engine
//! writes missed records and deletes expired started records, nothing else.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Missed-occurrence record written by the engine.
///
/// Denormalizes the task and assignee so the record stays meaningful even if
/// the task definition is later edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedRecord {
    /// When the engine recorded the miss.
    pub missed_at: DateTime<Utc>,
    /// Task the occurrence belongs to.
    pub task_id: String,
    /// Task name at recording time.
    pub task_name: String,
    /// Task description at recording time.
    pub task_description: String,
    /// Recurrence kind of the task (`daily`, `weekly`, `monthly`).
    pub recurrence: String,
    /// Tolerance that was in effect, in minutes.
    pub start_tolerance_minutes: i64,
    /// Assignee id, when the task had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    /// Resolved assignee display name, or a sentinel.
    pub assignee_name: String,
}

/// Recorded completion/start state for one task on one calendar day.
#[derive(Debug, Clone, Default)]
pub struct DayState {
    /// Times with a completed record (terminal).
    pub completed: BTreeSet<String>,
    /// Times with a started-but-not-completed record.
    pub started: BTreeSet<String>,
    /// Times already recorded as missed (terminal).
    pub missed: BTreeSet<String>,
}

impl DayState {
    /// Build day state from the raw per-day containers.
    ///
    /// `completed_day` maps time strings to started/completed records;
    /// entries with a non-null `completedAt` are completed, the rest are
    /// started. `missed_day` maps time strings to missed records.
    #[must_use]
    pub fn from_values(completed_day: Option<&Value>, missed_day: Option<&Value>) -> Self {
        let mut state = Self::default();

        if let Some(entries) = completed_day.and_then(Value::as_object) {
            for (time, record) in entries {
                let completed = record
                    .get("completedAt")
                    .is_some_and(|value| !value.is_null());
                if completed {
                    state.completed.insert(time.clone());
                } else {
                    state.started.insert(time.clone());
                }
            }
        }

        if let Some(entries) = missed_day.and_then(Value::as_object) {
            for time in entries.keys() {
                state.missed.insert(time.clone());
            }
        }

        state
    }
}

/// Best-effort display name from a personnel or identity document.
///
/// Tries `fullName`, `displayName`, and `name` before falling back to
/// `firstName` + `lastName`.
#[must_use]
pub fn display_name(value: &Value) -> Option<String> {
    let doc = value.as_object()?;

    for key in ["fullName", "displayName", "name"] {
        if let Some(name) = doc.get(key).and_then(Value::as_str) {
            if !name.is_empty() {
                return Some(name.to_owned());
            }
        }
    }

    let first = doc.get("firstName").and_then(Value::as_str).unwrap_or("");
    let last = doc.get("lastName").and_then(Value::as_str).unwrap_or("");
    let joined = format!("{first} {last}");
    let joined = joined.trim();
    if joined.is_empty() {
        None
    } else {
        Some(joined.to_owned())
    }
}
