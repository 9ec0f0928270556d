//! Occurrence resolution.
//!
//! Given a task definition and a calendar day, produce the ordered list of
//! expected occurrence times for that day. Pure function of task + date; an
//! empty result means the task is not scheduled that day.

use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use super::keys;
use crate::domain::tasks::{weekday_name, Recurrence, TaskDefinition};

/// Expected occurrence times for `task` on `date`, sorted ascending.
///
/// Repetition times are logically unordered in storage; sorting here is what
/// makes the classifier's "next occurrence" lookup well-defined. Yearly tasks
/// are never resolved per-day.
#[must_use]
pub fn resolve(task: &TaskDefinition, date: NaiveDate) -> Vec<String> {
    let mut times = match &task.recurrence {
        Recurrence::Daily { times } => times.clone(),
        Recurrence::Weekly { times, weekdays } => {
            let today = weekday_name(date.weekday());
            if weekdays.iter().any(|day| day == today) {
                times.clone()
            } else {
                Vec::new()
            }
        }
        Recurrence::Monthly { months } => {
            keys::resolve_day_container(months, date.month(), date.day())
                .and_then(|day| day.get("repetitionTimes"))
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
        Recurrence::Yearly { .. } => Vec::new(),
    };
    times.sort();
    times
}
