//! HTTP API for kubeask

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use kubeask_k8s::ClusterReader;
use kubeask_query::QueryEngine;
use kubeask_types::{
    DeploymentSummary, Fetched, NamespaceScope, PodSummary, QueryResult, ServiceSummary,
};

const INDEX_HTML: &str = include_str!("../assets/index.html");
const APP_JS: &str = include_str!("../assets/app.js");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<dyn ClusterReader>,
    pub engine: QueryEngine,
    pub default_namespace: Arc<str>,
}

impl AppState {
    pub fn new(
        reader: Arc<dyn ClusterReader>,
        engine: QueryEngine,
        default_namespace: &str,
    ) -> Self {
        Self {
            reader,
            engine,
            default_namespace: Arc::from(default_namespace),
        }
    }

    fn scope(&self, namespace: Option<String>) -> NamespaceScope {
        let namespace = namespace.unwrap_or_else(|| self.default_namespace.to_string());
        NamespaceScope::parse(&namespace)
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/js/app.js", get(app_js))
        .route("/healthz", get(healthz))
        .route("/api/pods", get(list_pods))
        .route("/api/services", get(list_services))
        .route("/api/deployments", get(list_deployments))
        .route("/api/query", post(query))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Static & Health
// ============================================================================

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], APP_JS)
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// ============================================================================
// Resource Routes
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NamespaceParams {
    pub namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PodParams {
    pub namespace: Option<String>,
    pub label_selector: Option<String>,
}

// List failures come back as `{"error": ...}` with a 200, same as successes.

async fn list_pods(
    State(state): State<AppState>,
    Query(params): Query<PodParams>,
) -> Json<Fetched<PodSummary>> {
    let scope = state.scope(params.namespace);
    Json(
        state
            .reader
            .pods(&scope, params.label_selector.as_deref())
            .await,
    )
}

async fn list_services(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Json<Fetched<ServiceSummary>> {
    let scope = state.scope(params.namespace);
    Json(state.reader.services(&scope).await)
}

async fn list_deployments(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Json<Fetched<DeploymentSummary>> {
    let scope = state.scope(params.namespace);
    Json(state.reader.deployments(&scope).await)
}

// ============================================================================
// Query Route
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: Option<String>,
    pub namespace: Option<String>,
}

/// Error returned when the model endpoint can't be reached
pub struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = format!("{:#}", self.0);
        error!(error = %message, "query failed");
        (StatusCode::BAD_GATEWAY, Json(json!({ "error": message }))).into_response()
    }
}

async fn query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResult>, ApiError> {
    let question = req.question.unwrap_or_default();
    let namespace = req
        .namespace
        .unwrap_or_else(|| state.default_namespace.to_string());

    info!(%namespace, %question, "query received");
    let result = state.engine.answer(&question, &namespace).await?;
    Ok(Json(result))
}
