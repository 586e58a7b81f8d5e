//! Speech narration
//!
//! Submits narration text with a locale-selected voice and returns the
//! audio payload as base64 (24 kHz mono PCM per the audio contract). No
//! schema is involved.

use std::sync::Arc;

use krishi_core::Language;
use krishi_genai::wire::{Content, GenerateContentRequest, GenerationConfig, SpeechConfig};
use krishi_genai::{GenAiError, ModelTransport};

/// Generates narration audio for advisory text
pub struct SpeechGenerator {
    transport: Arc<dyn ModelTransport>,
    model: String,
}

impl SpeechGenerator {
    pub fn new(transport: Arc<dyn ModelTransport>, model: impl Into<String>) -> Self {
        Self { transport, model: model.into() }
    }

    /// Synthesize `text` in the language's pinned voice.
    ///
    /// Returns the base64-encoded audio payload; a response without one is
    /// [`GenAiError::NoAudioData`].
    pub async fn speak(&self, text: &str, language: Language) -> Result<String, GenAiError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(text)],
            system_instruction: None,
            tools: None,
            tool_config: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::voice(language.voice())),
                ..Default::default()
            }),
        };

        tracing::info!(model = %self.model, voice = language.voice(), "Synthesizing narration");
        let response = self.transport.generate_content(&self.model, request).await?;
        response
            .inline_data()
            .map(|payload| payload.data.clone())
            .ok_or(GenAiError::NoAudioData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::testing::StubTransport;

    fn audio_body() -> String {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{
                "inlineData": {"mimeType": "audio/pcm;rate=24000", "data": "UFBQUA=="}
            }]}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn returns_base64_payload_and_pins_voice() {
        let transport = Arc::new(StubTransport::new(vec![Ok(audio_body())]));
        let generator =
            SpeechGenerator::new(transport.clone(), "gemini-2.5-flash-preview-tts");

        let audio = generator.speak("नमस्ते किसान मित्र", Language::Hindi).await.unwrap();
        assert_eq!(audio, "UFBQUA==");

        let calls = transport.calls.lock().unwrap();
        let config = &calls[0].1["generationConfig"];
        assert_eq!(config["responseModalities"][0], "AUDIO");
        assert_eq!(
            config["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
    }

    #[tokio::test]
    async fn text_only_response_is_no_audio_data() {
        let transport =
            Arc::new(StubTransport::new(vec![Ok(StubTransport::text_body("sorry"))]));
        let generator =
            SpeechGenerator::new(transport.clone(), "gemini-2.5-flash-preview-tts");
        let err = generator.speak("hello", Language::English).await.unwrap_err();
        assert!(matches!(err, GenAiError::NoAudioData));
    }
}
