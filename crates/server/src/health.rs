use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::routes::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub store: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = store_check(&state).await;
    let service = HealthCheck { status: "ok", detail: "service responding".to_owned() };

    let healthy = store.status == "ok";
    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        service,
        store,
        checked_at: Utc::now().to_rfc3339(),
    };
    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(response))
}

async fn store_check(state: &AppState) -> HealthCheck {
    match state.store.load_agent("project-manager").await {
        Ok(_) => HealthCheck { status: "ok", detail: "agent records resolvable".to_owned() },
        Err(error) => HealthCheck { status: "failing", detail: error.to_string() },
    }
}
