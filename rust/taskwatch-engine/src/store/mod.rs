//! Hierarchical document store abstraction.
//!
//! The concrete database behind the task tracker is an external collaborator;
//! the engine only consumes the path-addressed [`DocumentStore`] contract.
//! Two implementations ship with the crate: an in-memory JSON tree used by
//! tests and embedded runs, and a JSON-file-backed variant for standalone
//! deployments.

pub mod file;
pub mod memory;
pub mod paths;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use paths::RecordScope;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Path-addressed document store.
///
/// Paths are `/`-separated segment lists (`tenants/{id}/tasks/{taskId}`).
/// All operations are create-or-replace / merge / delete semantics; deleting
/// an absent path is not an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the value at `path`, or `None` when absent.
    async fn get(&self, path: &str) -> anyhow::Result<Option<Value>>;

    /// Create or replace the value at `path`.
    async fn set(&self, path: &str, value: Value) -> anyhow::Result<()>;

    /// Merge `fields` into the object at `path`, creating it when absent.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> anyhow::Result<()>;

    /// Delete the value at `path`. Absent paths are a no-op.
    async fn delete(&self, path: &str) -> anyhow::Result<()>;

    /// Child keys of the container at `path`, sorted ascending.
    ///
    /// Absent or non-container paths yield an empty list.
    async fn list(&self, path: &str) -> anyhow::Result<Vec<String>>;
}
