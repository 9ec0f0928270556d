//! Compliance classification.
//!
//! Compares the resolved occurrences of one task/day against recorded state
//! and the current wall-clock time. Produces the times that must be recorded
//! as newly missed and the started records whose completion deadline has
//! elapsed. Pure function; the recorder applies the results.

use chrono::{NaiveTime, Timelike};

use crate::config::EngineConfig;
use crate::domain::records::DayState;
use crate::domain::tasks::TaskDefinition;
use crate::timeutil::{minutes_of_day, parse_hhmm, time_minutes};

/// Result of classifying one task for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Times to record as missed, in occurrence order.
    pub newly_missed: Vec<String>,
    /// Started records whose deadline has elapsed; to be deleted.
    pub expired_started: Vec<String>,
}

impl Classification {
    /// Whether the classification requires any store writes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.newly_missed.is_empty() && self.expired_started.is_empty()
    }
}

/// Whether occurrence time `(hour, minute)` is past due at `now` given a
/// tolerance in minutes.
fn is_past(now: NaiveTime, hour: u32, minute: u32, tolerance: i64) -> bool {
    now.hour() > hour
        || (now.hour() == hour && i64::from(now.minute()) > i64::from(minute) + tolerance)
}

/// Classify `occurrences` (sorted ascending) for `task` against `now`.
///
/// Rules:
/// - only `accepted` tasks with at least one occurrence are evaluated;
/// - completed and already-missed times are terminal and skipped;
/// - started times are in progress and judged by their deadline, not their
///   nominal time;
/// - a past, unrecorded time becomes newly missed;
/// - a started time expires once `now` passes its deadline: the next
///   occurrence's time minus the tolerance, or started time plus the
///   last-occurrence window when nothing later is scheduled today.
///
/// Malformed time strings are skipped silently.
#[must_use]
pub fn classify(
    task: &TaskDefinition,
    occurrences: &[String],
    state: &DayState,
    now: NaiveTime,
    config: &EngineConfig,
) -> Classification {
    let mut result = Classification::default();
    if !task.status.is_accepted() || occurrences.is_empty() {
        return result;
    }

    let tolerance = task.start_tolerance_minutes;

    for time in occurrences {
        let Some((hour, minute)) = parse_hhmm(time) else {
            continue;
        };
        if state.completed.contains(time)
            || state.missed.contains(time)
            || state.started.contains(time)
        {
            continue;
        }
        if is_past(now, hour, minute, tolerance) {
            result.newly_missed.push(time.clone());
        }
    }

    let now_minutes = time_minutes(now);
    for (index, time) in occurrences.iter().enumerate() {
        if !state.started.contains(time) || state.completed.contains(time) {
            continue;
        }
        let Some((hour, minute)) = parse_hhmm(time) else {
            continue;
        };

        let deadline = occurrences[index + 1..]
            .iter()
            .find_map(|next| parse_hhmm(next))
            .map_or_else(
                || minutes_of_day(hour, minute) + config.last_occurrence_window_minutes,
                |(next_hour, next_minute)| minutes_of_day(next_hour, next_minute) - tolerance,
            );

        if now_minutes > deadline {
            result.expired_started.push(time.clone());
            if !state.missed.contains(time) && !result.newly_missed.contains(time) {
                result.newly_missed.push(time.clone());
            }
        }
    }

    result
}
