//! JSON-file-backed document store.
//!
//! Standalone deployments persist the document tree as a single pretty-printed
//! JSON file. Every mutation rewrites the file; the compliance job writes a
//! handful of records per run, so simplicity wins over write batching here.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{DocumentStore, MemoryStore};

/// Document store persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl FileStore {
    /// Open a store at `path`, loading the existing tree when the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let inner = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let root: Value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("malformed store file {}", path.display()))?;
                MemoryStore::with_root(root)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => MemoryStore::new(),
            Err(err) => {
                return Err(err).with_context(|| format!("cannot read {}", path.display()));
            }
        };
        Ok(Self { inner, path })
    }

    async fn persist(&self) -> anyhow::Result<()> {
        let snapshot = self.inner.snapshot().await;
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        // Write to a sibling temp file, then rename over the target, so a
        // crash mid-write never leaves a truncated store behind.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("cannot write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("cannot replace {}", self.path.display()))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Value>> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, value: Value) -> anyhow::Result<()> {
        self.inner.set(path, value).await?;
        self.persist().await
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> anyhow::Result<()> {
        self.inner.update(path, fields).await?;
        self.persist().await
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.inner.delete(path).await?;
        self.persist().await
    }

    async fn list(&self, path: &str) -> anyhow::Result<Vec<String>> {
        self.inner.list(path).await
    }
}
