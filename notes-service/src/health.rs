//! Health check handlers

use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    state::AppState,
    store::{Filter, NoteStore},
};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Readiness check response with dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,

    /// Service name
    pub service: String,

    /// Dependency statuses
    pub dependencies: HashMap<String, DependencyStatus>,
}

/// Individual dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyStatus {
    /// Dependency is healthy
    pub healthy: bool,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Liveness probe
///
/// Always returns 200 OK while the process is serving.
pub async fn health<S: NoteStore>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: state.config().service.name.clone(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness probe
///
/// Issues a count that matches nothing; 503 if the store cannot answer it.
pub async fn readiness<S: NoteStore>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let probe = Filter::Any(Vec::new());
    let store_status = match state.store().count(&probe, &CancellationToken::new()).await {
        Ok(_) => DependencyStatus {
            healthy: true,
            message: Some("Reachable".to_string()),
        },
        Err(e) => {
            tracing::error!("Store readiness check failed: {}", e);
            DependencyStatus {
                healthy: false,
                message: Some(format!("Probe failed: {}", e.kind)),
            }
        }
    };

    let ready = store_status.healthy;
    let mut dependencies = HashMap::new();
    dependencies.insert("store".to_string(), store_status);

    let response = ReadinessResponse {
        ready,
        service: state.config().service.name.clone(),
        dependencies,
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
