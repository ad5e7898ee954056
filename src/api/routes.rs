use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::audit::AuditStore;
use crate::engine::{EvalError, EvaluationService};
use crate::observability::MetricsRegistry;
use crate::store::InMemoryRuleStore;

use super::request::ExpenseRequest;
use super::response::{ErrorResponse, HealthResponse, ReadyResponse};

/// Shared application state.
pub struct AppState {
    /// Evaluation orchestration
    pub service: EvaluationService,

    /// Audit store, read directly for listings
    pub audit_store: Arc<dyn AuditStore>,

    /// Rule store, read for health/readiness info
    pub rule_store: Arc<InMemoryRuleStore>,

    /// Metrics registry
    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,

    /// Records returned per audit listing
    pub audit_page_size: usize,
}

/// Create the application router.
///
/// CORS is permissive; the evaluate/audit endpoints are called from a
/// browser-based admin console.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/orgs/:org_id/policy/evaluate", post(handle_evaluate))
        .route("/orgs/:org_id/policy/audit", get(handle_audit))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handle expense evaluation requests.
async fn handle_evaluate(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<String>,
    Json(req): Json<ExpenseRequest>,
) -> axum::response::Response {
    let start = Instant::now();
    let expense = req.into_expense();

    match state.service.evaluate(&org_id, expense).await {
        Ok(evaluation) => {
            state.metrics.record_latency(start);
            (StatusCode::OK, Json(evaluation.result)).into_response()
        }
        Err(EvalError::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation(message)),
        )
            .into_response(),
    }
}

/// List the most recent audit records for an organization, newest first.
async fn handle_audit(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<String>,
) -> axum::response::Response {
    match state
        .audit_store
        .recent(&org_id, state.audit_page_size)
        .await
    {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            warn!(organization_id = %org_id, error = %e, "Failed to list audits");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("audit store unavailable")),
            )
                .into_response()
        }
    }
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        ruleset_version: state.rule_store.version().to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness check endpoint.
async fn handle_ready(State(state): State<Arc<AppState>>) -> axum::response::Response {
    if state.rule_store.organization_count() == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("No rule sets loaded", "NOT_READY")),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            ruleset_version: state.rule_store.version().to_string(),
            organizations: state.rule_store.organization_count(),
        }),
    )
        .into_response()
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        state.metrics.to_prometheus(),
    )
}
