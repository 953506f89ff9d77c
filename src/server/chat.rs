//! Chat widget WebSocket: one transcript per connection.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::AppState;
use crate::assistant::{AssistantFlow, ChatTranscript};

/// Message from chat client → server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Message { content: String },
}

/// Message from server → chat client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Response { content: String },
    Error { message: String },
}

pub(super) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    info!("Chat client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.assistant))
}

async fn handle_socket(mut socket: WebSocket, assistant: AssistantFlow) {
    info!("Chat client connected");
    let mut transcript = ChatTranscript::new();

    while let Some(result) = socket.recv().await {
        let reply = match result {
            Ok(Message::Text(text)) => handle_text(&text, &mut transcript, &assistant).await,
            Ok(Message::Ping(data)) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    break;
                }
                continue;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "Chat WebSocket error");
                break;
            }
        };

        if let Ok(json) = serde_json::to_string(&reply)
            && socket.send(Message::Text(json.into())).await.is_err()
        {
            debug!("Chat client disconnected during send");
            break;
        }
    }

    info!(messages = transcript.len(), "Chat connection closed");
}

async fn handle_text(
    text: &str,
    transcript: &mut ChatTranscript,
    assistant: &AssistantFlow,
) -> ServerMessage {
    let content = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Message { content }) => content,
        Err(e) => {
            debug!(error = %e, "Unrecognized chat message");
            return ServerMessage::Error {
                message: format!("Mensaje no reconocido: {e}"),
            };
        }
    };

    if !transcript.push_user(&content) {
        return ServerMessage::Error {
            message: "El mensaje está vacío.".to_string(),
        };
    }

    let reply = assistant.ask(transcript.messages()).await;
    ServerMessage::Response {
        content: transcript.record_reply(reply).to_string(),
    }
}
