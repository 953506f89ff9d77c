//! Audio plumbing: base64 data URIs and the WAV container.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::SpeechError;

/// Sample rate of synthesized speech.
pub const PCM_SAMPLE_RATE: u32 = 24_000;
/// Synthesized speech is mono.
pub const PCM_CHANNELS: u16 = 1;

/// Decoded audio with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AudioData {
    /// Parse `data:<mime>;base64,<payload>`.
    pub fn from_data_uri(uri: &str) -> Result<Self, SpeechError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| SpeechError::InvalidDataUri("missing 'data:' prefix".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| SpeechError::InvalidDataUri("missing ',' separator".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| SpeechError::InvalidDataUri("payload is not base64".to_string()))?;
        if mime_type.is_empty() {
            return Err(SpeechError::InvalidDataUri("missing MIME type".to_string()));
        }

        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| SpeechError::InvalidDataUri(e.to_string()))?;
        if bytes.is_empty() {
            return Err(SpeechError::InvalidDataUri("empty audio payload".to_string()));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }

    pub fn base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Wrap little-endian 16-bit PCM in a WAV container.
pub fn pcm16_to_wav(pcm: &[u8], channels: u16, sample_rate: u32) -> Result<Vec<u8>, SpeechError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    if pcm.len() % 2 != 0 {
        tracing::debug!(bytes = pcm.len(), "Dropping trailing odd PCM byte");
    }

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for frame in pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([frame[0], frame[1]]))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Synthesized speech as a `data:audio/wav;base64,…` URI.
pub fn speech_to_wav_data_uri(pcm: &[u8]) -> Result<String, SpeechError> {
    let wav = pcm16_to_wav(pcm, PCM_CHANNELS, PCM_SAMPLE_RATE)?;
    Ok(AudioData {
        mime_type: "audio/wav".to_string(),
        bytes: wav,
    }
    .to_data_uri())
}
