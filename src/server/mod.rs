//! HTTP + WebSocket surface of the configurator.

mod assistant;
mod chat;
mod sessions;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::assistant::{AssistantFlow, VoiceAssistant};
use crate::catalog::Catalog;
use crate::configurator::SessionStore;
use crate::error::WizardError;
use crate::orders::OrderService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionStore>,
    pub orders: Arc<OrderService>,
    pub assistant: AssistantFlow,
    /// Voice endpoint; `None` when no speech provider is configured.
    pub voice: Option<VoiceAssistant>,
}

/// Build the full router: assistant, wizard sessions, catalog, chat socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(catalog))
        .route("/api/ask-assistant", post(assistant::ask_assistant))
        .route("/api/voice-assistant", post(assistant::voice_assistant))
        .route("/ws/chat", get(chat::ws_handler))
        .merge(sessions::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "plan-configurator",
        "sessions": state.sessions.len().await,
        "voice": state.voice.is_some(),
    }))
}

async fn catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.catalog.as_ref().clone())
}

/// A JSON error response.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub(crate) fn with_body(status: StatusCode, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub(crate) fn session_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Session not found")
    }
}

/// Unwrap a JSON body, answering a rejected one with 400 `{error}`.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(status = %rejection.status(), "Rejected request body");
            Err(ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}

impl From<WizardError> for ApiError {
    fn from(e: WizardError) -> Self {
        match e {
            WizardError::InvalidTransition { .. } | WizardError::MissingCustomer { .. } => {
                Self::new(StatusCode::CONFLICT, e.to_string())
            }
            WizardError::InvalidCustomer(fields) => Self::with_body(
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Invalid customer information", "fields": fields }),
            ),
            WizardError::EmptySelection | WizardError::Selection(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
