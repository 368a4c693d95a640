//! HTTP server for the query relay.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/query` | Forward a prompt to the model, return `{ "answer": ... }` |
//! | `GET`  | `/health` | Health check |
//!
//! # Error Contract
//!
//! Every non-2xx response has the shape
//!
//! ```json
//! { "error": "Failed to get response from AI", "details": "<upstream body>" }
//! ```
//!
//! with `details` set for upstream failures and `message` set for internal
//! errors.
//!
//! # CORS
//!
//! Only `server.allowed_origin` is allowed, with `GET`, `POST` and
//! `OPTIONS`, the `Content-Type` and `Authorization` headers, and
//! credentials.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use context_relay_core::log::InteractionLog;
use context_relay_core::wire::{ErrorResponse, HealthResponse, QueryRequest, QueryResponse};

use crate::config::Config;
use crate::db;
use crate::migrate::ensure_schema;
use crate::model::{GeminiClient, ModelClient};
use crate::relay::{Relay, RelayError};
use crate::sqlite_log::SqliteInteractionLog;

/// Largest accepted request body. PDF previews are small, but clients may
/// send whole documents in the prompt.
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Shared application state passed to route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Starts the relay server.
///
/// Opens the interaction log (creating the schema if needed), builds the
/// Gemini client from the environment, and serves until the process is
/// terminated.
pub async fn run_server(config: &Config) -> Result<()> {
    let model: Arc<dyn ModelClient> = Arc::new(GeminiClient::new(&config.model)?);

    let pool = db::connect(config).await?;
    ensure_schema(&pool).await?;
    let log: Arc<dyn InteractionLog> = Arc::new(SqliteInteractionLog::new(pool));

    let relay = Relay::new(&config.relay, model, log);
    let app = build_router(AppState::new(relay), &config.server.allowed_origin)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!(target: "relay::startup", "Backend running at http://{}", config.server.bind);
    tracing::info!(
        target: "relay::startup",
        "Query endpoint: http://{}/api/query (model {})",
        config.server.bind,
        config.model.model
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the router with CORS, tracing and body-size layers applied.
pub fn build_router(state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin: HeaderValue = allowed_origin
        .parse()
        .with_context(|| format!("Invalid allowed origin: {}", allowed_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/api/query", post(handle_query))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

// ============ Error response ============

fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::MissingPrompt => error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: self.to_string(),
                    details: None,
                    message: None,
                },
            ),
            RelayError::Upstream { status, ref body } => error_response(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorResponse {
                    error: self.to_string(),
                    details: Some(body.clone()),
                    message: None,
                },
            ),
            RelayError::Model(_) | RelayError::Persistence(_) => internal_error(self.to_string()),
        }
    }
}

fn internal_error(message: String) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse {
            error: "Internal server error".to_string(),
            details: None,
            message: Some(message),
        },
    )
}

// ============ GET /health ============

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    })
}

// ============ POST /api/query ============

async fn handle_query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Invalid request body".to_string(),
                    details: None,
                    message: Some(rejection.body_text()),
                },
            );
        }
    };

    match state.relay.handle_query(request).await {
        Ok(answer) => Json::<QueryResponse>(answer).into_response(),
        Err(e) => e.into_response(),
    }
}
