//! Speech-to-text and text-to-speech.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use super::audio::AudioData;
use crate::error::SpeechError;

const GEMINI_API: &str = "https://generativelanguage.googleapis.com";
const TRANSCRIBE_PROMPT: &str = "Transcribe el siguiente audio:";

/// Transcribes user audio and voices assistant replies.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Audio in, transcript out.
    async fn transcribe(&self, audio: &AudioData) -> Result<String, SpeechError>;

    /// Text in, raw 16-bit little-endian mono PCM at 24 kHz out.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Models and voice used for speech.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub transcribe_model: String,
    pub tts_model: String,
    pub voice: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            transcribe_model: "gemini-2.0-flash".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Algenib".to_string(),
        }
    }
}

impl SpeechConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            transcribe_model: std::env::var("CONFIGURATOR_TRANSCRIBE_MODEL")
                .unwrap_or(defaults.transcribe_model),
            tts_model: std::env::var("CONFIGURATOR_TTS_MODEL").unwrap_or(defaults.tts_model),
            voice: std::env::var("CONFIGURATOR_TTS_VOICE").unwrap_or(defaults.voice),
        }
    }
}

/// Speech over the Gemini `generateContent` REST endpoint.
pub struct GeminiSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    config: SpeechConfig,
    base_url: String,
}

impl GeminiSpeech {
    pub fn new(client: reqwest::Client, api_key: SecretString, config: SpeechConfig) -> Self {
        Self {
            client,
            api_key,
            config,
            base_url: GEMINI_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn generate(&self, model: &str, body: Value) -> Result<Value, reqwest::Error> {
        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);
        self.client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl SpeechProvider for GeminiSpeech {
    async fn transcribe(&self, audio: &AudioData) -> Result<String, SpeechError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {"text": TRANSCRIBE_PROMPT},
                    {"inline_data": {"mime_type": audio.mime_type, "data": audio.base64()}}
                ]
            }]
        });

        let response = self
            .generate(&self.config.transcribe_model, body)
            .await
            .map_err(|e| SpeechError::TranscriptionFailed(e.to_string()))?;
        let text = response_text(&response);
        tracing::debug!(
            model = %self.config.transcribe_model,
            chars = text.len(),
            "Transcribed audio"
        );
        Ok(text)
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": text}]}],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": {"voiceName": self.config.voice}
                    }
                }
            }
        });

        let response = self
            .generate(&self.config.tts_model, body)
            .await
            .map_err(|e| SpeechError::SynthesisFailed(e.to_string()))?;
        let pcm = response_audio(&response)?;
        tracing::debug!(
            model = %self.config.tts_model,
            voice = %self.config.voice,
            bytes = pcm.len(),
            "Synthesized speech"
        );
        Ok(pcm)
    }
}

fn first_parts(response: &Value) -> &[Value] {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Concatenated text parts of the first candidate.
fn response_text(response: &Value) -> String {
    first_parts(response)
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Decoded inline audio of the first candidate.
fn response_audio(response: &Value) -> Result<Vec<u8>, SpeechError> {
    let data = first_parts(response)
        .iter()
        .find_map(|part| {
            part.get("inlineData")
                .or_else(|| part.get("inline_data"))
                .and_then(|d| d.get("data"))
                .and_then(Value::as_str)
        })
        .ok_or_else(|| SpeechError::SynthesisFailed("response contained no audio".to_string()))?;

    let pcm = BASE64
        .decode(data)
        .map_err(|e| SpeechError::SynthesisFailed(e.to_string()))?;
    if pcm.is_empty() {
        return Err(SpeechError::SynthesisFailed("response audio is empty".to_string()));
    }
    Ok(pcm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};

    #[test]
    fn extracts_text_parts() {
        let response = json!({"candidates": [{"content": {"parts": [
            {"text": " Hola, "}, {"text": "¿qué planes hay? "}
        ]}}]});
        assert_eq!(response_text(&response), "Hola, ¿qué planes hay?");
        assert_eq!(response_text(&json!({})), "");
    }

    #[test]
    fn extracts_inline_audio() {
        let response = json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAEC"}}
        ]}}]});
        assert_eq!(response_audio(&response).unwrap(), vec![0, 1, 2]);
        assert!(matches!(
            response_audio(&json!({"candidates": []})),
            Err(SpeechError::SynthesisFailed(_))
        ));
    }

    async fn fake_gemini(
        Path(model): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        assert_eq!(headers["x-goog-api-key"], "k");
        if model.starts_with("tts-model") {
            assert_eq!(body["generationConfig"]["responseModalities"][0], "AUDIO");
            let voice = &body["generationConfig"]["speechConfig"]["voiceConfig"]
                ["prebuiltVoiceConfig"]["voiceName"];
            assert_eq!(voice, "Algenib");
            Json(json!({"candidates": [{"content": {"parts": [
                {"inlineData": {"data": "AAAAAA=="}}
            ]}}]}))
        } else {
            assert_eq!(body["contents"][0]["parts"][0]["text"], TRANSCRIBE_PROMPT);
            assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["mime_type"], "audio/webm");
            Json(json!({"candidates": [{"content": {"parts": [{"text": "hola"}]}}]}))
        }
    }

    #[tokio::test]
    async fn round_trips_through_rest_endpoint() {
        let app = Router::new().route("/v1beta/models/{model}", post(fake_gemini));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = SpeechConfig {
            transcribe_model: "stt-model".to_string(),
            tts_model: "tts-model".to_string(),
            ..SpeechConfig::default()
        };
        let speech = GeminiSpeech::new(reqwest::Client::new(), SecretString::from("k"), config)
            .with_base_url(&format!("http://127.0.0.1:{port}"));

        let audio = AudioData::from_data_uri("data:audio/webm;base64,AQID").unwrap();
        assert_eq!(speech.transcribe(&audio).await.unwrap(), "hola");
        assert_eq!(speech.synthesize("hola").await.unwrap(), vec![0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn http_failure_is_a_speech_error() {
        let speech = GeminiSpeech::new(
            reqwest::Client::new(),
            SecretString::from("k"),
            SpeechConfig::default(),
        )
        .with_base_url("http://127.0.0.1:1");

        assert!(matches!(
            speech.synthesize("hola").await,
            Err(SpeechError::SynthesisFailed(_))
        ));
    }
}
