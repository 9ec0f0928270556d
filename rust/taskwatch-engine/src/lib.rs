//! Taskwatch compliance engine.
//!
//! Periodic backend job for the taskwatch staff task tracker: for every
//! tenant and every recurring task definition, determine which scheduled
//! occurrences today were completed, which are still pending, and which were
//! *missed*, and durably record newly-missed occurrences exactly once.
//!
//! # Architecture
//!
//! - [`timeutil`]: clock abstraction and `HH:MM` parsing
//! - [`store`]: path-addressed document store contract and implementations
//! - [`domain`]: task definitions, recurrence sum type, occurrence records
//! - [`engine`]: occurrence resolution, ambiguous-key probing,
//!   classification, missed-occurrence recording, tenant orchestration
//! - [`auth`]: privileged job authentication
//! - [`progress`]: append-only run progress reporting
//! - [`config`]: layered configuration and the named grace-period defaults
//! - [`trigger`]: HTTP wrapper around the engine entrypoint
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use taskwatch_engine::auth::SharedSecretAuth;
//! use taskwatch_engine::config::AppConfig;
//! use taskwatch_engine::engine::ComplianceEngine;
//! use taskwatch_engine::progress::TracingSink;
//! use taskwatch_engine::store::FileStore;
//! use taskwatch_engine::timeutil::SystemClock;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let store = Arc::new(FileStore::open("taskwatch-store.json").await?);
//!     let auth = Arc::new(SharedSecretAuth::new(
//!         config.auth.service_credential.clone(),
//!         config.auth.subject.clone(),
//!     ));
//!     let engine = ComplianceEngine::new(
//!         store,
//!         auth,
//!         Arc::new(SystemClock),
//!         Arc::new(TracingSink),
//!         config.engine,
//!     );
//!     let summary = engine.run().await?;
//!     println!("{} missed occurrence(s) recorded", summary.missed_recorded);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod progress;
pub mod store;
pub mod timeutil;
pub mod trigger;

pub use engine::{ComplianceEngine, RunSummary};
pub use error::EngineError;
