//! Conversational assistant over the catalog, by text and by voice.
//!
//! The assistant never touches wizard state: it reads the static catalog (or
//! external documents, in tools mode) and answers the latest user question.

pub mod audio;
pub mod chat;
pub mod flow;
pub mod prompts;
pub mod speech;
pub mod voice;

pub use chat::{APOLOGY_MESSAGE, ChatTranscript};
pub use flow::{AssistantFlow, AssistantMode, MAX_TOOL_ROUNDS};
pub use speech::{GeminiSpeech, SpeechConfig, SpeechProvider};
pub use voice::{VoiceAssistant, VoiceInput, VoiceOutput, VoiceText};

use serde::{Deserialize, Serialize};

/// Who wrote a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One message of an assistant conversation, as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: MessageRole,
    pub content: String,
    /// Audio data URI, voice conversations only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

impl AssistantMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            audio: None,
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Model,
            content: content.into(),
            audio: None,
        }
    }
}
