// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the fetch gate service.
//!
//! Fetchers running in other processes ask `/check` before each request and
//! post bodies to `/sanitize` afterwards.

use crate::config::Config;
use crate::gate::FetchGate;
use crate::limiter::SlotState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Shared application state.
pub struct AppState {
    pub gate: FetchGate,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Gate check request.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub url: String,
    /// Report the verdict without waiting for or recording a slot
    #[serde(default)]
    pub dry_run: bool,
}

/// Gate check response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waited_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/check", post(check))
        .route("/sanitize", post(sanitize));

    if state.config.metrics.enabled && state.gate.metrics().is_some() {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "fetch-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Check a candidate URL against the gate.
///
/// Unless `dry_run` is set, the response is held until the URL's domain
/// may be fetched. A client that disconnects while waiting gives up its
/// place without consuming the slot.
pub async fn check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Json<CheckResponse> {
    debug!(url = %req.url, dry_run = req.dry_run, "Processing gate check");

    if req.dry_run {
        let host = match state.gate.evaluate(&req.url) {
            Ok(host) => host,
            Err(err) => return Json(refused(err.code(), err.to_string())),
        };
        let retry_after_ms = match state.gate.limiter().check(&host).await {
            SlotState::Throttled { retry_after } => Some(retry_after.as_millis() as u64),
            SlotState::Unvisited | SlotState::Ready => None,
        };
        return Json(CheckResponse {
            allowed: true,
            code: None,
            reason: None,
            waited_ms: None,
            retry_after_ms,
        });
    }

    match state.gate.admit(&req.url).await {
        Ok(admission) => Json(CheckResponse {
            allowed: true,
            code: None,
            reason: None,
            waited_ms: Some(admission.waited.as_millis() as u64),
            retry_after_ms: None,
        }),
        Err(err) => {
            info!(url = %req.url, error = %err, "Gate check refused");
            Json(refused(err.code(), err.to_string()))
        }
    }
}

fn refused(code: &str, reason: String) -> CheckResponse {
    CheckResponse {
        allowed: false,
        code: Some(code.to_string()),
        reason: Some(reason),
        waited_ms: None,
        retry_after_ms: None,
    }
}

/// Sanitize a fetched markup body on the blocking pool.
pub async fn sanitize(State(state): State<Arc<AppState>>, body: String) -> Response {
    match tokio::task::spawn_blocking(move || state.gate.sanitize(&body)).await {
        Ok(clean) => clean.into_response(),
        Err(e) => {
            error!(error = %e, "Sanitizer task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Prometheus exposition endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let Some(metrics) = state.gate.metrics() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match metrics.render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
