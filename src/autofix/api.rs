use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::sync::broadcast;

use super::classifier::ErrorClassifier;
use super::intake::WebhookIntake;
use super::models::{FixLookup, IssueEvent, IssueStatus, UNKNOWN_ERROR_TYPE, WebhookAck};
use super::query::QueryService;
use super::store::IssueStore;
use crate::errors::AutofixError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub store: IssueStore,
    pub intake: WebhookIntake,
    pub query: QueryService,
    pub events: broadcast::Sender<IssueEvent>,
}

impl AppState {
    /// Wire a store, intake and query service around one classifier.
    pub fn new(store: IssueStore, classifier: ErrorClassifier) -> Self {
        let classifier = Arc::new(classifier);
        let (events, _rx) = broadcast::channel::<IssueEvent>(256);
        Self {
            intake: WebhookIntake::new(store.clone(), Arc::clone(&classifier), events.clone()),
            query: QueryService::new(store.clone(), classifier),
            store,
            events,
        }
    }
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct AnalyzeRequest {
    pub error_type: Option<String>,
    pub error_message: Option<String>,
    pub stacktrace: Option<String>,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

/// Handlers only read the store, so any store error is a server fault.
impl From<AutofixError> for ApiError {
    fn from(err: AutofixError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // No size cap: oversized Sentry events are still recorded.
        .route(
            "/webhook/sentry",
            post(receive_sentry_webhook).layer(DefaultBodyLimit::disable()),
        )
        .route("/issues", get(list_issues))
        .route("/issues/{id}", get(get_issue))
        .route("/fix/{id}", get(get_fix))
        .route("/analyze", post(analyze_manual))
        .route("/test/{error_type}", get(test_analysis))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "sentry-autofix",
        "status": "running",
        "endpoints": {
            "POST /webhook/sentry": "Receive Sentry alerts",
            "GET /issues": "List all received issues",
            "GET /issues/{id}": "Get an issue with its analysis",
            "GET /fix/{id}": "Get the fix PR descriptor for an analyzed issue",
            "POST /analyze": "Analyze an error without storing it",
            "GET /test/{error_type}": "Preview the analysis for an error type",
            "GET /health": "Liveness check"
        }
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn receive_sentry_webhook(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // The classification handle is dropped: the task keeps running detached
    // and is tracked by the intake for shutdown.
    let receipt = state.intake.receive(&body)?;
    Ok(Json(WebhookAck {
        status: IssueStatus::Received,
        issue_id: receipt.issue.id,
    }))
}

async fn list_issues(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.query.list_issues()?))
}

async fn get_issue(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.query.get_issue(&id)?))
}

async fn get_fix(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let response = match state.query.fix_for_issue(&id)? {
        FixLookup::Ready(pr_info) => Json(pr_info).into_response(),
        FixLookup::Pending => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "error": "Issue not analyzed yet",
                "status": IssueStatus::Received,
            })),
        )
            .into_response(),
        FixLookup::NotFound => Json(serde_json::json!({"error": "Issue not found"})).into_response(),
    };
    Ok(response)
}

async fn analyze_manual(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: AnalyzeRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid analyze request: {}", e)))?;
    let error_type = req.error_type.unwrap_or_else(|| UNKNOWN_ERROR_TYPE.to_string());
    let result = state.query.classify_ad_hoc(
        &error_type,
        req.error_message.as_deref().unwrap_or_default(),
        req.stacktrace.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(result))
}

async fn test_analysis(
    State(state): State<SharedState>,
    Path(error_type): Path<String>,
) -> impl IntoResponse {
    Json(state.query.test_classify(&error_type))
}

// ── Tests ─────────────────────────────────────────────────────────────
