//! Voice turn: transcribe, answer, speak.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::audio::{AudioData, speech_to_wav_data_uri};
use super::flow::AssistantFlow;
use super::speech::SpeechProvider;
use super::AssistantMessage;
use crate::error::{AssistantError, SpeechError};

/// One recorded user utterance plus the conversation so far.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInput {
    pub audio_data_uri: String,
    #[serde(default)]
    pub history: Vec<AssistantMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceText {
    pub user_input: String,
    pub model_response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceOutput {
    pub text: VoiceText,
    /// `data:audio/wav;base64,…`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Clone)]
pub struct VoiceAssistant {
    flow: AssistantFlow,
    speech: Arc<dyn SpeechProvider>,
}

impl VoiceAssistant {
    pub fn new(flow: AssistantFlow, speech: Arc<dyn SpeechProvider>) -> Self {
        Self { flow, speech }
    }

    pub async fn process(&self, input: VoiceInput) -> Result<VoiceOutput, AssistantError> {
        let audio = AudioData::from_data_uri(&input.audio_data_uri)?;

        let transcript = self.speech.transcribe(&audio).await?;
        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(SpeechError::TranscriptionFailed(
                "La transcripción de audio falló.".to_string(),
            )
            .into());
        }
        tracing::info!(chars = transcript.len(), "Voice input transcribed");

        let mut history = input.history;
        history.push(AssistantMessage::user(transcript.clone()));
        let reply = self.flow.ask(&history).await?;

        let pcm = self.speech.synthesize(&reply).await?;
        if pcm.is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "La conversión de texto a voz falló.".to_string(),
            )
            .into());
        }
        let audio = speech_to_wav_data_uri(&pcm)?;

        Ok(VoiceOutput {
            text: VoiceText {
                user_input: transcript,
                model_response: reply,
            },
            audio: Some(audio),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::assistant::AssistantMode;
    use crate::catalog::Catalog;
    use crate::error::LlmError;
    use crate::llm::{
        CompletionRequest, CompletionResponse, FinishReason, LlmProvider, ToolCompletionRequest,
        ToolCompletionResponse,
    };

    struct EchoLlm {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for EchoLlm {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let prompt = request.messages[0].content.clone();
            self.prompts.lock().unwrap().push(prompt);
            Ok(CompletionResponse {
                content: "Tenemos tres planes.".to_string(),
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }

        async fn complete_with_tools(
            &self,
            _request: ToolCompletionRequest,
        ) -> Result<ToolCompletionResponse, LlmError> {
            unreachable!("context mode only")
        }
    }

    struct StubSpeech {
        transcript: String,
        pcm: Vec<u8>,
    }

    #[async_trait]
    impl SpeechProvider for StubSpeech {
        async fn transcribe(&self, _audio: &AudioData) -> Result<String, SpeechError> {
            Ok(self.transcript.clone())
        }

        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
            if self.pcm.is_empty() {
                return Err(SpeechError::SynthesisFailed("no audio".to_string()));
            }
            Ok(self.pcm.clone())
        }
    }

    fn assistant(transcript: &str, pcm: Vec<u8>) -> (VoiceAssistant, Arc<EchoLlm>) {
        let llm = Arc::new(EchoLlm {
            prompts: Mutex::new(Vec::new()),
        });
        let flow = AssistantFlow::new(
            llm.clone(),
            Arc::new(Catalog::builtin()),
            AssistantMode::Context,
        );
        let speech = Arc::new(StubSpeech {
            transcript: transcript.to_string(),
            pcm,
        });
        (VoiceAssistant::new(flow, speech), llm)
    }

    fn input() -> VoiceInput {
        VoiceInput {
            audio_data_uri: "data:audio/webm;base64,AQID".to_string(),
            history: vec![
                AssistantMessage::user("Hola"),
                AssistantMessage::model("¡Hola!"),
            ],
        }
    }

    #[tokio::test]
    async fn full_voice_turn() {
        let (voice, llm) = assistant(" ¿Qué planes tienen? ", vec![0, 0, 16, 0]);
        let output = voice.process(input()).await.unwrap();

        assert_eq!(output.text.user_input, "¿Qué planes tienen?");
        assert_eq!(output.text.model_response, "Tenemos tres planes.");
        assert!(output.audio.unwrap().starts_with("data:audio/wav;base64,"));

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("**Pregunta actual del usuario:**\n¿Qué planes tienen?"));
    }

    #[tokio::test]
    async fn empty_transcript_fails_the_turn() {
        let (voice, llm) = assistant("  ", vec![0, 0]);
        let err = voice.process(input()).await.unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Speech(SpeechError::TranscriptionFailed(_))
        ));
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn synthesis_failure_fails_the_turn() {
        let (voice, _) = assistant("hola", Vec::new());
        assert!(matches!(
            voice.process(input()).await,
            Err(AssistantError::Speech(SpeechError::SynthesisFailed(_)))
        ));
    }

    #[tokio::test]
    async fn invalid_data_uri_is_rejected() {
        let (voice, _) = assistant("hola", vec![0, 0]);
        let bad = VoiceInput {
            audio_data_uri: "not-a-data-uri".to_string(),
            history: Vec::new(),
        };
        assert!(matches!(
            voice.process(bad).await,
            Err(AssistantError::Speech(SpeechError::InvalidDataUri(_)))
        ));
    }

    #[test]
    fn output_wire_format() {
        let output = VoiceOutput {
            text: VoiceText {
                user_input: "a".to_string(),
                model_response: "b".to_string(),
            },
            audio: None,
        };
        assert_eq!(
            serde_json::to_value(output).unwrap(),
            serde_json::json!({"text": {"userInput": "a", "modelResponse": "b"}})
        );
    }
}
