//! HTTP boundary: SMS webhook, check-in trigger and health check.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::checkin::CheckInGate;
use crate::error::{CheckInError, IngestError};
use crate::ingest::{InboundMessage, IngestionService, Outcome};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestionService>,
    pub checkin: Arc<CheckInGate>,
}

/// Build the Axum router.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/android-webhook", post(android_webhook))
        .route("/trigger-daily-checkin", get(trigger_daily_checkin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Personal Health SMS Bot is running"
    }))
}

// ── Webhook ─────────────────────────────────────────────────────────────

/// POST /android-webhook
///
/// Body: `{"sender": "+1234567890", "body": "SMS text here"}`.
async fn android_webhook(
    State(state): State<AppState>,
    payload: Result<Json<InboundMessage>, JsonRejection>,
) -> Response {
    let Json(message) = match payload {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Invalid payload received");
            return invalid_payload();
        }
    };

    match state.ingest.ingest(&message).await {
        Ok(ingested) => (StatusCode::OK, Json(outcome_body(ingested.outcome))).into_response(),
        Err(IngestError::InvalidPayload(reason)) => {
            warn!(reason = %reason, "Invalid payload received");
            invalid_payload()
        }
        Err(IngestError::Storage(e)) => {
            error!(error = %e, "Failed to log entry");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to log entry"})),
            )
                .into_response()
        }
        Err(IngestError::Notify { outcome, source }) => {
            error!(error = %source, outcome = outcome.label(), "Failed to send reply SMS");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "Failed to send SMS", "status": outcome.label()})),
            )
                .into_response()
        }
    }
}

fn outcome_body(outcome: Outcome) -> serde_json::Value {
    match outcome {
        Outcome::Logged(urgency) => json!({"status": outcome.label(), "urgency": urgency.get()}),
        _ => json!({"status": outcome.label()}),
    }
}

fn invalid_payload() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "Invalid payload"})),
    )
        .into_response()
}

// ── Check-in trigger ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TriggerParams {
    secret: Option<String>,
}

/// GET /trigger-daily-checkin?secret=...
async fn trigger_daily_checkin(
    State(state): State<AppState>,
    Query(params): Query<TriggerParams>,
) -> Response {
    match state.checkin.trigger(params.secret.as_deref()).await {
        Ok(()) => (StatusCode::OK, "Triggered").into_response(),
        Err(CheckInError::Unauthorized) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        )
            .into_response(),
        Err(CheckInError::Delivery(e)) => {
            error!(error = %e, "Failed to send check-in SMS");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to send SMS"})),
            )
                .into_response()
        }
    }
}
