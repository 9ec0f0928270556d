//! Engine error taxonomy.
//!
//! Only two failure classes may abort an entire run: privileged
//! authentication failure and store connectivity failure during setup.
//! Everything below tenant level degrades or is silently skipped; see the
//! per-component error policy in the orchestrator.

use thiserror::Error;

/// Fatal errors that abort a compliance run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The privileged job identity could not be established.
    #[error("privileged authentication failed: {0}")]
    Authentication(anyhow::Error),

    /// The document store was unreachable while setting up the run.
    #[error("document store unavailable: {0}")]
    Store(anyhow::Error),
}
