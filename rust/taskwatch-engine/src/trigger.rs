//! HTTP trigger surface.
//!
//! Wraps the engine entrypoint behind a shared-secret query parameter so an
//! external scheduler can invoke compliance runs over HTTP. The wrapper adds
//! nothing to the engine semantics: one request, one blocking run, one small
//! JSON status body.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::engine::ComplianceEngine;

/// Shared state for the trigger routes.
#[derive(Clone)]
pub struct TriggerState {
    /// The engine to run.
    pub engine: Arc<ComplianceEngine>,
    /// Shared secret required as the `key` query parameter.
    pub shared_secret: Option<String>,
}

impl std::fmt::Debug for TriggerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerState").finish_non_exhaustive()
    }
}

/// Build the trigger router.
pub fn router(state: TriggerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/run", get(run_job))
        .with_state(state)
}

/// Health probe.
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Query parameters for the run endpoint.
#[derive(Debug, Deserialize)]
struct RunParams {
    /// Shared secret.
    key: Option<String>,
}

/// Execute one compliance run.
///
/// # Endpoint
///
/// `GET /api/v1/run?key=SECRET`
async fn run_job(
    State(state): State<TriggerState>,
    Query(params): Query<RunParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Some(secret) = state.shared_secret.as_deref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Trigger secret not configured".to_string(),
        ));
    };
    if params.key.as_deref() != Some(secret) {
        return Err((StatusCode::UNAUTHORIZED, "Invalid trigger key".to_string()));
    }

    let summary = state
        .engine
        .run()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({
        "status": "ok",
        "missedRecorded": summary.missed_recorded,
        "tenantsProcessed": summary.tenants_processed,
        "tenants": summary.tenants,
    })))
}
