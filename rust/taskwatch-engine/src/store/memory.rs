//! In-memory document store.
//!
//! Backs tests and embedded runs with a JSON tree behind an async `RwLock`.
//! Path segments map to nested JSON object keys; intermediate containers are
//! created on write.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::DocumentStore;

/// In-memory JSON-tree store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    root: Arc<RwLock<Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Object(Map::new()))),
        }
    }

    /// Create a store seeded with an existing JSON tree.
    #[must_use]
    pub fn with_root(root: Value) -> Self {
        Self {
            root: Arc::new(RwLock::new(root)),
        }
    }

    /// Snapshot of the whole tree.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }

    fn segments(path: &str) -> Vec<&str> {
        path.split('/').filter(|s| !s.is_empty()).collect()
    }

    fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
        let mut current = root;
        for segment in Self::segments(path) {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Walk to the object that should contain the final path segment,
    /// creating intermediate objects, and return it with that segment.
    fn lookup_parent_mut<'a>(root: &'a mut Value, path: &str) -> Option<(&'a mut Map<String, Value>, String)> {
        let segments = Self::segments(path);
        let (last, parents) = segments.split_last()?;
        let mut current = root;
        for segment in parents {
            let map = current.as_object_mut()?;
            current = map
                .entry((*segment).to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        // A scalar in the middle of the requested path cannot hold children.
        let map = current.as_object_mut()?;
        Some((map, (*last).to_owned()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Value>> {
        let root = self.root.read().await;
        Ok(Self::lookup(&root, path).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> anyhow::Result<()> {
        let mut root = self.root.write().await;
        let Some((parent, key)) = Self::lookup_parent_mut(&mut root, path) else {
            anyhow::bail!("cannot write through a non-container value at {path}");
        };
        parent.insert(key, value);
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> anyhow::Result<()> {
        let mut root = self.root.write().await;
        let Some((parent, key)) = Self::lookup_parent_mut(&mut root, path) else {
            anyhow::bail!("cannot write through a non-container value at {path}");
        };
        let target = parent
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(object) = target.as_object_mut() else {
            anyhow::bail!("cannot merge fields into a non-object value at {path}");
        };
        for (name, value) in fields {
            object.insert(name, value);
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let mut root = self.root.write().await;
        let segments = Self::segments(path);
        let Some((last, parents)) = segments.split_last() else {
            return Ok(());
        };
        let mut current = &mut *root;
        for segment in parents {
            match current.as_object_mut().and_then(|m| m.get_mut(*segment)) {
                Some(next) => current = next,
                None => return Ok(()),
            }
        }
        if let Some(map) = current.as_object_mut() {
            map.remove(*last);
        }
        Ok(())
    }

    async fn list(&self, path: &str) -> anyhow::Result<Vec<String>> {
        let root = self.root.read().await;
        let keys = Self::lookup(&root, path)
            .and_then(Value::as_object)
            .map(|map| {
                let mut keys: Vec<String> = map.keys().cloned().collect();
                keys.sort();
                keys
            })
            .unwrap_or_default();
        Ok(keys)
    }
}
