//! Text assistant flow: prompt rendering, completion, optional tool loop.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{AssistantError, LlmError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, ToolCompletionRequest};
use crate::tools::ToolRegistry;

use super::prompts::{context_prompt, tools_prompt};
use super::{AssistantMessage, MessageRole};

/// Upper bound on model/tool round trips for one answer.
pub const MAX_TOOL_ROUNDS: usize = 5;

/// How the assistant gets its product knowledge.
#[derive(Clone)]
pub enum AssistantMode {
    /// Catalog and plans injected into the prompt as JSON.
    Context,
    /// Model reads the listed documents through tools.
    Tools {
        registry: Arc<ToolRegistry>,
        document_urls: Vec<String>,
    },
}

impl AssistantMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Context => "context",
            Self::Tools { .. } => "tools",
        }
    }
}

/// Answers the latest user question of a conversation.
#[derive(Clone)]
pub struct AssistantFlow {
    llm: Arc<dyn LlmProvider>,
    catalog: Arc<Catalog>,
    mode: AssistantMode,
}

impl AssistantFlow {
    pub fn new(llm: Arc<dyn LlmProvider>, catalog: Arc<Catalog>, mode: AssistantMode) -> Self {
        Self { llm, catalog, mode }
    }

    pub fn mode(&self) -> &AssistantMode {
        &self.mode
    }

    /// Produce a non-empty reply to the last message of `history`.
    pub async fn ask(&self, history: &[AssistantMessage]) -> Result<String, AssistantError> {
        let last = history.last().ok_or(AssistantError::EmptyHistory)?;
        if last.role != MessageRole::User {
            return Err(AssistantError::LastMessageNotFromUser);
        }

        tracing::debug!(
            mode = self.mode.name(),
            model = self.llm.model_name(),
            turns = history.len(),
            "Asking assistant"
        );

        let reply = match &self.mode {
            AssistantMode::Context => self.ask_with_context(history).await?,
            AssistantMode::Tools {
                registry,
                document_urls,
            } => {
                self.ask_with_tools(registry, document_urls, history)
                    .await?
            }
        };

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: "empty reply".to_string(),
            }
            .into());
        }
        Ok(reply.to_string())
    }

    async fn ask_with_context(&self, history: &[AssistantMessage]) -> Result<String, AssistantError> {
        let prompt = context_prompt(&self.catalog, history).map_err(LlmError::from)?;
        let response = self
            .llm
            .complete(CompletionRequest::new(vec![ChatMessage::user(prompt)]))
            .await?;

        tracing::debug!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Assistant completion finished"
        );
        Ok(response.content)
    }

    async fn ask_with_tools(
        &self,
        registry: &ToolRegistry,
        document_urls: &[String],
        history: &[AssistantMessage],
    ) -> Result<String, AssistantError> {
        let tools = registry.tool_definitions().await;
        let mut messages = vec![ChatMessage::user(tools_prompt(document_urls, history))];

        for round in 1..=MAX_TOOL_ROUNDS {
            let response = self
                .llm
                .complete_with_tools(ToolCompletionRequest::new(messages.clone(), tools.clone()))
                .await?;

            if response.tool_calls.is_empty() {
                tracing::debug!(round, "Assistant answered without further tool calls");
                return Ok(response.content.unwrap_or_default());
            }

            let calls = response.tool_calls.clone();
            messages.push(ChatMessage::assistant_with_tool_calls(
                response.content,
                response.tool_calls,
            ));

            for call in calls {
                tracing::info!(round, tool = %call.name, "Executing tool call");
                let output = match registry.execute(&call.name, call.arguments).await {
                    Ok(output) => output.content,
                    Err(e) => {
                        tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                        format!("Error: {e}")
                    }
                };
                messages.push(ChatMessage::tool_result(call.id, call.name, output));
            }
        }

        Err(AssistantError::ToolLoopExhausted {
            max: MAX_TOOL_ROUNDS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::documents::SampleDocumentSource;
    use crate::llm::{
        CompletionResponse, FinishReason, Role, ToolCall, ToolCompletionResponse,
    };
    use crate::tools::FetchDocumentTool;

    /// Replies with canned text and records every request it sees.
    struct StubLlm {
        reply: String,
        tool_script: Mutex<VecDeque<ToolCompletionResponse>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl StubLlm {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                tool_script: Mutex::new(VecDeque::new()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn scripted(script: Vec<ToolCompletionResponse>) -> Arc<Self> {
            Arc::new(Self {
                reply: String::new(),
                tool_script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request.messages);
            Ok(CompletionResponse {
                content: self.reply.clone(),
                input_tokens: 10,
                output_tokens: 5,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }

        async fn complete_with_tools(
            &self,
            request: ToolCompletionRequest,
        ) -> Result<ToolCompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request.messages);
            Ok(self
                .tool_script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| text_response("fin")))
        }
    }

    fn text_response(text: &str) -> ToolCompletionResponse {
        ToolCompletionResponse {
            content: Some(text.to_string()),
            tool_calls: Vec::new(),
            input_tokens: 1,
            output_tokens: 1,
            finish_reason: FinishReason::Stop,
        }
    }

    fn fetch_call(url: &str) -> ToolCompletionResponse {
        ToolCompletionResponse {
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: "fetchDocumentContent".to_string(),
                arguments: serde_json::json!({"url": url}),
            }],
            input_tokens: 1,
            output_tokens: 1,
            finish_reason: FinishReason::ToolUse,
        }
    }

    fn context_flow(llm: Arc<StubLlm>) -> AssistantFlow {
        AssistantFlow::new(llm, Arc::new(Catalog::builtin()), AssistantMode::Context)
    }

    fn tools_flow(llm: Arc<StubLlm>) -> AssistantFlow {
        let registry = Arc::new(ToolRegistry::new());
        registry.register_sync(Arc::new(FetchDocumentTool::new(Arc::new(
            SampleDocumentSource,
        ))));
        AssistantFlow::new(
            llm,
            Arc::new(Catalog::builtin()),
            AssistantMode::Tools {
                registry,
                document_urls: SampleDocumentSource::known_urls(),
            },
        )
    }

    #[tokio::test]
    async fn answers_price_question() {
        let llm = StubLlm::replying("  El Bot de Ventas cuesta $750 al mes.\n");
        let flow = context_flow(llm.clone());

        let reply = flow
            .ask(&[AssistantMessage::user("¿cuánto cuesta el bot de ventas?")])
            .await
            .unwrap();
        assert_eq!(reply, "El Bot de Ventas cuesta $750 al mes.");

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].role, Role::User);
        assert!(seen[0][0].content.contains("bot-ventas"));
    }

    #[tokio::test]
    async fn rejects_empty_history() {
        let flow = context_flow(StubLlm::replying("x"));
        assert!(matches!(
            flow.ask(&[]).await,
            Err(AssistantError::EmptyHistory)
        ));
    }

    #[tokio::test]
    async fn rejects_history_ending_with_model() {
        let flow = context_flow(StubLlm::replying("x"));
        let history = [AssistantMessage::user("hola"), AssistantMessage::model("hola")];
        assert!(matches!(
            flow.ask(&history).await,
            Err(AssistantError::LastMessageNotFromUser)
        ));
    }

    #[tokio::test]
    async fn empty_reply_is_an_error() {
        let flow = context_flow(StubLlm::replying("   "));
        let err = flow.ask(&[AssistantMessage::user("hola")]).await.unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Llm(LlmError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn tool_mode_feeds_document_back_to_model() {
        let llm = StubLlm::scripted(vec![
            fetch_call("https://docs.google.com/document/d/planes-empresariales"),
            text_response("El plan Profesional cuesta $1600 al mes."),
        ]);
        let flow = tools_flow(llm.clone());

        let reply = flow
            .ask(&[AssistantMessage::user("¿Qué planes tienen?")])
            .await
            .unwrap();
        assert_eq!(reply, "El plan Profesional cuesta $1600 al mes.");

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let tool_turn = seen[1].last().unwrap();
        assert_eq!(tool_turn.role, Role::Tool);
        assert!(tool_turn.content.contains("$1600/mes"));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_model() {
        let llm = StubLlm::scripted(vec![
            ToolCompletionResponse {
                tool_calls: vec![ToolCall {
                    id: "x".to_string(),
                    name: "deleteEverything".to_string(),
                    arguments: serde_json::json!({}),
                }],
                ..fetch_call("")
            },
            text_response("No puedo hacer eso."),
        ]);
        let flow = tools_flow(llm.clone());

        flow.ask(&[AssistantMessage::user("hola")]).await.unwrap();
        let seen = llm.seen.lock().unwrap();
        assert!(seen[1].last().unwrap().content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn tool_loop_is_bounded() {
        let script = (0..MAX_TOOL_ROUNDS + 1)
            .map(|_| fetch_call("https://docs.google.com/document/d/productos-y-servicios"))
            .collect();
        let llm = StubLlm::scripted(script);
        let flow = tools_flow(llm.clone());

        let err = flow.ask(&[AssistantMessage::user("hola")]).await.unwrap_err();
        assert!(matches!(err, AssistantError::ToolLoopExhausted { max: 5 }));
        assert_eq!(llm.seen.lock().unwrap().len(), MAX_TOOL_ROUNDS);
    }
}
