//! Ambiguous calendar-key resolution.
//!
//! Monthly recurrence data is stored under keys like `month3`/`month03` and
//! `day5`/`day05`, and the numbering may be 0- or 1-based depending on which
//! client version originally wrote the tenant's data. These helpers find the
//! key that actually exists without assuming a fixed convention: detect the
//! textual format from the container's own keys, try the primary spelling,
//! then probe the remaining candidates in a fixed order.
//!
//! This is best-effort read-time reconciliation, never a migration: the
//! underlying data is not mutated.

use serde_json::{Map, Value};

/// Detected textual encoding of numeric key suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// Two-digit zero-padded suffixes (`month03`).
    Padded,
    /// Bare-digit suffixes (`month3`).
    Unpadded,
    /// No key with the prefix and a numeric suffix exists.
    Unknown,
}

/// Detect the suffix format of keys carrying `prefix` in `keys`.
pub fn detect_format<'a, I>(keys: I, prefix: &str) -> KeyFormat
where
    I: IntoIterator<Item = &'a String>,
{
    let mut saw_bare_digit = false;
    for key in keys {
        let Some(suffix) = key.strip_prefix(prefix) else {
            continue;
        };
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if suffix.len() == 2 {
            return KeyFormat::Padded;
        }
        saw_bare_digit = true;
    }
    if saw_bare_digit {
        KeyFormat::Unpadded
    } else {
        KeyFormat::Unknown
    }
}

/// Resolve the key for 1-based `number` inside `container`.
///
/// The primary candidate uses the detected format (padded when undetected).
/// On a miss the alternatives `{prefix}{n}`, `{prefix}{n:02}`,
/// `{prefix}{n-1}`, `{prefix}{n-1:02}` are probed in order, covering both
/// 0-/1-based numbering and both paddings. Returns `None` when nothing
/// matches, meaning "not scheduled".
#[must_use]
pub fn resolve_key(container: &Map<String, Value>, prefix: &str, number: u32) -> Option<String> {
    let primary = match detect_format(container.keys(), prefix) {
        KeyFormat::Unpadded => format!("{prefix}{number}"),
        KeyFormat::Padded | KeyFormat::Unknown => format!("{prefix}{number:02}"),
    };
    if container.contains_key(&primary) {
        return Some(primary);
    }

    let mut candidates = vec![format!("{prefix}{number}"), format!("{prefix}{number:02}")];
    if let Some(previous) = number.checked_sub(1) {
        candidates.push(format!("{prefix}{previous}"));
        candidates.push(format!("{prefix}{previous:02}"));
    }
    candidates
        .into_iter()
        .find(|candidate| container.contains_key(candidate))
}

/// Resolve the day sub-container for a real (1-based) month and day.
///
/// Applies the detect-then-probe procedure at the month level, then again at
/// the day level within the matched month container.
#[must_use]
pub fn resolve_day_container<'a>(
    months: &'a Map<String, Value>,
    month: u32,
    day: u32,
) -> Option<&'a Value> {
    let month_key = resolve_key(months, "month", month)?;
    let month_container = months.get(&month_key)?.as_object()?;
    let day_key = resolve_key(month_container, "day", day)?;
    month_container.get(&day_key)
}
