//! Privileged job authentication.
//!
//! The compliance run must establish a privileged identity before any tenant
//! data is touched. The concrete identity provider is an external
//! collaborator; the engine only depends on the [`Authenticator`] trait so
//! tests can substitute an always-succeeding or always-failing implementation.

use async_trait::async_trait;

/// Identity established for one compliance run.
#[derive(Debug, Clone)]
pub struct PrivilegedIdentity {
    /// Subject the run executes as (service account name).
    pub subject: String,
}

/// Establishes the privileged identity for a run.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate the job runner.
    ///
    /// # Errors
    ///
    /// Any error here is fatal for the invocation: the orchestrator aborts
    /// before processing a single tenant and reports zero totals.
    async fn authenticate(&self) -> anyhow::Result<PrivilegedIdentity>;
}

/// Authenticator backed by a shared service credential from configuration.
///
/// The credential itself comes from the environment
/// (`TASKWATCH_SERVICE_CREDENTIAL`) or a config file; an empty or missing
/// credential is an authentication failure, not a silent pass.
#[derive(Debug, Clone)]
pub struct SharedSecretAuth {
    credential: Option<String>,
    subject: String,
}

impl SharedSecretAuth {
    /// Create an authenticator for the given credential.
    #[must_use]
    pub fn new(credential: Option<String>, subject: impl Into<String>) -> Self {
        Self {
            credential,
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl Authenticator for SharedSecretAuth {
    async fn authenticate(&self) -> anyhow::Result<PrivilegedIdentity> {
        match self.credential.as_deref() {
            Some(credential) if !credential.is_empty() => Ok(PrivilegedIdentity {
                subject: self.subject.clone(),
            }),
            _ => anyhow::bail!("no service credential configured"),
        }
    }
}
