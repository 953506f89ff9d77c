//! Running transcript for a chat widget conversation.

use super::AssistantMessage;
use crate::error::AssistantError;

/// Shown in place of a reply when the assistant fails.
pub const APOLOGY_MESSAGE: &str =
    "Lo siento, he tenido un problema para responder. Por favor, inténtalo de nuevo.";

/// Append-only list of messages exchanged in one chat.
#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    messages: Vec<AssistantMessage>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[AssistantMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Add a user message. Blank input is ignored and returns `false`.
    pub fn push_user(&mut self, content: &str) -> bool {
        let content = content.trim();
        if content.is_empty() {
            return false;
        }
        self.messages.push(AssistantMessage::user(content));
        true
    }

    /// Record the assistant's answer, or the apology if it failed.
    /// Returns the text that was appended.
    pub fn record_reply(&mut self, reply: Result<String, AssistantError>) -> &str {
        let content = match reply {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Assistant reply failed");
                APOLOGY_MESSAGE.to_string()
            }
        };
        self.messages.push(AssistantMessage::model(content));
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or(APOLOGY_MESSAGE)
    }
}
