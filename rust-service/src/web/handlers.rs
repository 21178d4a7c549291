//! Webhook endpoint handlers.
//!
//! The GitHub handler does three things in order:
//! 1. Verify the `X-Hub-Signature` header against the raw body
//! 2. List the repository's workflow runs
//! 3. Run the cancellation sweep
//!
//! Verification is a hard gate: no registry call happens before it passes.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::github::RunRegistry;
use crate::sweep::cancel_superseded;
use crate::web::signature::{verify_signature, SIGNATURE_HEADER};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<dyn RunRegistry>,
}

impl AppState {
    pub fn new(config: Config, registry: Arc<dyn RunRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// GitHub Webhook
// =============================================================================

/// Webhook response.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<usize>,
}

/// GitHub webhook endpoint.
///
/// The caller only ever learns "bad signature" (400), "could not list
/// runs" (500), or "sweep done" (200). Individual cancel failures stay
/// inside the 200.
pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    let signature_header = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    info!(
        body_length = body.len(),
        has_signature = signature_header.is_some(),
        "github_webhook_received"
    );

    if let Err(e) = verify_signature(&state.config.webhook_secret, &body, signature_header) {
        warn!(error = %e, "github_signature_rejected");
        return (
            StatusCode::BAD_REQUEST,
            Json(WebhookResponse {
                status: "invalid_signature",
                detail: Some(e.to_string()),
                cancelled: None,
            }),
        );
    }

    let runs = match state.registry.list_runs().await {
        Ok(runs) => runs,
        Err(e) => {
            error!(error = %e, "workflow_run_list_failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WebhookResponse {
                    status: "error",
                    detail: None,
                    cancelled: None,
                }),
            );
        }
    };

    let stats = cancel_superseded(state.registry.as_ref(), runs).await;

    (
        StatusCode::OK,
        Json(WebhookResponse {
            status: "ok",
            detail: None,
            cancelled: Some(stats.cancelled),
        }),
    )
}
