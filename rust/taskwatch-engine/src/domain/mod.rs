//! Core domain models.
//!
//! - [`tasks`]: recurring task definitions and the recurrence sum type
//! - [`records`]: occurrence-record shapes and per-day completion state

pub mod records;
pub mod tasks;

pub use records::{DayState, MissedRecord};
pub use tasks::{Recurrence, TaskDefinition, TaskStatus};
