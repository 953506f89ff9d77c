//! Bridge from rig's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionModel, Message};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role, ToolCall,
    ToolCompletionRequest, ToolCompletionResponse, ToolDefinition,
};

/// Wraps any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }

    fn request_failed(&self, reason: impl std::fmt::Display) -> LlmError {
        LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: reason.to_string(),
        }
    }

    async fn send(
        &self,
        messages: Vec<ChatMessage>,
        tools: Vec<ToolDefinition>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<(Option<String>, Vec<ToolCall>, u32, u32), LlmError> {
        let converted = convert_messages(messages);
        let mut history = converted.history;
        let prompt = history.pop().ok_or_else(|| LlmError::InvalidResponse {
            provider: self.model_name.clone(),
            reason: "request has no user or assistant messages".to_string(),
        })?;

        let mut builder = self.model.completion_request(prompt).messages(history);
        if let Some(preamble) = converted.preamble {
            builder = builder.preamble(preamble);
        }
        if !tools.is_empty() {
            builder = builder.tools(
                tools
                    .into_iter()
                    .map(|t| rig::completion::ToolDefinition {
                        name: t.name,
                        description: t.description,
                        parameters: t.parameters,
                    })
                    .collect(),
            );
        }
        if let Some(max_tokens) = max_tokens {
            builder = builder.max_tokens(max_tokens as u64);
        }
        if let Some(temperature) = temperature {
            builder = builder.temperature(temperature as f64);
        }

        let response = self
            .model
            .completion(builder.build())
            .await
            .map_err(|e| self.request_failed(e))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for content in response.choice.iter() {
            match content {
                AssistantContent::Text(t) => text.push_str(&t.text),
                AssistantContent::ToolCall(tc) => tool_calls.push(ToolCall {
                    id: tc.id.clone(),
                    name: tc.function.name.clone(),
                    arguments: tc.function.arguments.clone(),
                }),
                _ => {}
            }
        }

        let content = if text.is_empty() { None } else { Some(text) };
        Ok((
            content,
            tool_calls,
            response.usage.input_tokens as u32,
            response.usage.output_tokens as u32,
        ))
    }
}

struct Converted {
    preamble: Option<String>,
    history: Vec<Message>,
}

/// System messages become the preamble; tool turns are folded into text so
/// every backend accepts them.
fn convert_messages(messages: Vec<ChatMessage>) -> Converted {
    let mut preamble: Vec<String> = Vec::new();
    let mut history = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => preamble.push(msg.content),
            Role::User => history.push(Message::user(msg.content)),
            Role::Assistant => {
                let mut text = msg.content;
                for call in &msg.tool_calls {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&format!("[tool call {}: {}]", call.name, call.arguments));
                }
                history.push(Message::assistant(text));
            }
            Role::Tool => {
                let name = msg.name.unwrap_or_else(|| "tool".to_string());
                history.push(Message::user(format!(
                    "[tool result {name}]\n{}",
                    msg.content
                )));
            }
        }
    }

    Converted {
        preamble: if preamble.is_empty() {
            None
        } else {
            Some(preamble.join("\n\n"))
        },
        history,
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (content, _, input_tokens, output_tokens) = self
            .send(
                request.messages,
                Vec::new(),
                request.max_tokens,
                request.temperature,
            )
            .await?;

        Ok(CompletionResponse {
            content: content.unwrap_or_default(),
            input_tokens,
            output_tokens,
            finish_reason: FinishReason::Stop,
            response_id: None,
        })
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse, LlmError> {
        let (content, tool_calls, input_tokens, output_tokens) = self
            .send(
                request.messages,
                request.tools,
                request.max_tokens,
                request.temperature,
            )
            .await?;

        let finish_reason = if tool_calls.is_empty() {
            FinishReason::Stop
        } else {
            FinishReason::ToolUse
        };
        Ok(ToolCompletionResponse {
            content,
            tool_calls,
            input_tokens,
            output_tokens,
            finish_reason,
        })
    }
}
