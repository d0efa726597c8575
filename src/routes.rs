//! Reference onboarding endpoints.
//!
//! Serves the status document the visibility policy consults, keyed by the
//! `X-User-Id` header (falling back to a single default user), and the
//! per-page flow definitions. Used for local development and in the
//! integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::status::STATUS_PATH;
use crate::tour::{FlowRegistry, PageId};

/// Header identifying the signed-in user.
pub const USER_HEADER: &str = "x-user-id";
/// User id when the header is absent.
pub const DEFAULT_USER: &str = "default";

#[derive(Debug, Clone, Default)]
struct UserRecord {
    status_checks: u64,
    completed_at: Option<DateTime<Utc>>,
}

/// Per-user onboarding records.
#[derive(Debug, Default)]
pub struct StatusStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

/// Status document as served.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub completed: bool,
    /// True until the user's first status check has been answered.
    pub is_first_time: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StatusStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer a status check and count it.
    pub async fn check(&self, user: &str) -> StatusResponse {
        let mut users = self.users.write().await;
        let record = users.entry(user.to_string()).or_default();
        let response = StatusResponse {
            completed: record.completed_at.is_some(),
            is_first_time: record.completed_at.is_none() && record.status_checks == 0,
            completed_at: record.completed_at,
        };
        record.status_checks += 1;
        response
    }

    /// Record completion. Repeated calls keep the first timestamp.
    pub async fn complete(&self, user: &str) -> StatusResponse {
        let mut users = self.users.write().await;
        let record = users.entry(user.to_string()).or_default();
        let completed_at = *record.completed_at.get_or_insert_with(Utc::now);
        StatusResponse {
            completed: true,
            is_first_time: false,
            completed_at: Some(completed_at),
        }
    }
}

/// Shared state for status routes.
#[derive(Clone)]
pub struct StatusRouteState {
    pub store: Arc<StatusStore>,
}

fn user_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_USER)
        .to_string()
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "workforce-tour-status"
    }))
}

/// GET /api/onboarding/status
async fn get_status(
    State(state): State<StatusRouteState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    Json(state.store.check(&user_id(&headers)).await)
}

/// POST /api/onboarding/complete
async fn complete(
    State(state): State<StatusRouteState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user = user_id(&headers);
    info!("Onboarding completed for user {}", user);
    Json(state.store.complete(&user).await)
}

/// Build the status routes. CORS is open since the tour runs in the browser.
pub fn status_routes(store: Arc<StatusStore>) -> Router {
    let state = StatusRouteState { store };
    Router::new()
        .route("/health", get(health))
        .route(STATUS_PATH, get(get_status))
        .route("/api/onboarding/complete", post(complete))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /api/onboarding/flows/{page}
async fn get_flow(
    State(flows): State<Arc<FlowRegistry>>,
    Path(page): Path<String>,
) -> Response {
    let flow = PageId::from_name(&page)
        .filter(|p| !p.is_unknown())
        .and_then(|p| flows.get_flow(p));
    match flow {
        Some(flow) => Json(flow.steps().to_vec()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("No tour for page {page}") })),
        )
            .into_response(),
    }
}

/// Serve flow definitions so the page can fetch its steps.
pub fn flow_routes(flows: Arc<FlowRegistry>) -> Router {
    Router::new()
        .route("/api/onboarding/flows/{page}", get(get_flow))
        .layer(CorsLayer::permissive())
        .with_state(flows)
}
