//! Assistant endpoints, JSON shapes kept compatible with the web client.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::error;

use super::{ApiError, AppState};
use crate::assistant::{AssistantMessage, VoiceInput, VoiceOutput};
use crate::error::{AssistantError, SpeechError};

const HISTORY_REQUIRED: &str = "El historial (history) es requerido y debe ser un array.";
const INVALID_INPUT: &str = "Entrada inválida.";

pub(super) async fn ask_assistant(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let history = body
        .ok()
        .and_then(|Json(mut body)| body.get_mut("history").map(Value::take))
        .filter(Value::is_array)
        .and_then(|history| serde_json::from_value::<Vec<AssistantMessage>>(history).ok())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, HISTORY_REQUIRED))?;

    match state.assistant.ask(&history).await {
        Ok(response) => Ok(Json(json!({ "response": response }))),
        Err(AssistantError::EmptyHistory) => {
            Err(ApiError::new(StatusCode::BAD_REQUEST, HISTORY_REQUIRED))
        }
        Err(e @ AssistantError::LastMessageNotFromUser) => {
            Err(ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            error!(error = %e, "Error in /api/ask-assistant");
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

pub(super) async fn voice_assistant(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VoiceOutput>, ApiError> {
    let input = match body {
        Ok(Json(value)) => serde_json::from_value::<VoiceInput>(value)
            .map_err(|e| invalid_input(e.to_string()))?,
        Err(rejection) => return Err(invalid_input(rejection.body_text())),
    };

    let Some(voice) = state.voice.as_ref() else {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "El asistente de voz no está configurado.",
        ));
    };

    match voice.process(input).await {
        Ok(output) => Ok(Json(output)),
        Err(AssistantError::Speech(SpeechError::InvalidDataUri(reason))) => {
            Err(invalid_input(format!("audioDataUri: {reason}")))
        }
        Err(e) => {
            error!(error = %e, "Error in /api/voice-assistant");
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

fn invalid_input(detail: String) -> ApiError {
    ApiError::with_body(
        StatusCode::BAD_REQUEST,
        json!({ "error": INVALID_INPUT, "details": [detail] }),
    )
}
