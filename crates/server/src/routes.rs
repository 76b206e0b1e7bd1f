//! HTTP transport: one JSON endpoint per flow.
//!
//! Every thrown engine error becomes the transport's standard failure
//! response: a status code, a user-safe message, and a correlation id; the
//! full detail goes to the log, not the wire.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use foreman_agent::engine::AgentEngine;
use foreman_agent::store::ConfigStore;
use foreman_core::errors::AgentError;
use foreman_core::history::History;
use foreman_core::schema::{Classification, CodeFile, Decision, Plan};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AgentEngine>,
    pub store: Arc<dyn ConfigStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/classify", post(classify))
        .route("/v1/decide", post(decide))
        .route("/v1/plan", post(plan))
        .route("/v1/generate-code", post(generate_code))
        .with_state(state.clone())
        .merge(crate::health::router(state))
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub classification: Classification,
}

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub history: History,
}

#[derive(Debug, Serialize)]
pub struct DecideResponse {
    pub decision: Decision,
}

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub task: String,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: Plan,
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub file: CodeFile,
}

async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let classification = state
        .engine
        .classify(&request.message)
        .await
        .map_err(ApiError::from_agent)?;
    Ok(Json(ClassifyResponse { classification }))
}

async fn decide(
    State(state): State<AppState>,
    Json(request): Json<DecideRequest>,
) -> Result<Json<DecideResponse>, ApiError> {
    let decision = state.engine.decide(&request.history).await.map_err(ApiError::from_agent)?;
    Ok(Json(DecideResponse { decision }))
}

async fn plan(
    State(state): State<AppState>,
    Json(request): Json<TaskRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    let plan = state.engine.plan(&request.task).await.map_err(ApiError::from_agent)?;
    Ok(Json(PlanResponse { plan }))
}

async fn generate_code(
    State(state): State<AppState>,
    Json(request): Json<TaskRequest>,
) -> Result<Json<CodeResponse>, ApiError> {
    let file = state.engine.generate_code(&request.task).await.map_err(ApiError::from_agent)?;
    Ok(Json(CodeResponse { file }))
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    correlation_id: String,
}

impl ApiError {
    fn from_agent(error: AgentError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        let (status, message) = match &error {
            AgentError::ConfigNotFound { .. }
            | AgentError::UnsupportedProvider { .. }
            | AgentError::StoreUnavailable { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The service is misconfigured. Contact the operator.",
            ),
            AgentError::GenerationFailed { .. } => (
                StatusCode::BAD_GATEWAY,
                "The generation service returned no usable output. Please retry.",
            ),
            AgentError::InvalidOutput { .. } => (
                StatusCode::BAD_GATEWAY,
                "The model produced output that failed validation. Please retry.",
            ),
        };

        error!(
            event_name = "transport.request_failed",
            correlation_id = %correlation_id,
            error = %error,
            "agent invocation failed"
        );

        Self { status, message, correlation_id }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    correlation_id: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body =
            ErrorBody { error: self.message, correlation_id: self.correlation_id };
        (self.status, Json(body)).into_response()
    }
}
