//! Live endpoint wire messages
//!
//! The Live API speaks JSON over WebSocket: one setup frame, then
//! realtimeInput frames carrying base64 PCM. Note that the server sends
//! all of its messages as Binary frames, including JSON control messages;
//! the session layer handles that quirk.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;

use krishi_core::Language;
use krishi_genai::wire::{Content, EmptyConfig, GenerationConfig, SpeechConfig};

/// Live WebSocket endpoint
pub const LIVE_WS_URL: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Outbound microphone audio MIME (16 kHz PCM mono)
pub const INPUT_AUDIO_MIME: &str = "audio/pcm;rate=16000";

/// Top-level setup message, the first frame of every session
#[derive(Debug, Serialize)]
pub struct SetupMessage {
    pub setup: SetupPayload,
}

#[derive(Debug, Serialize)]
pub struct SetupPayload {
    pub model: String,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
    #[serde(rename = "systemInstruction")]
    pub system_instruction: Content,
    #[serde(rename = "inputAudioTranscription")]
    pub input_audio_transcription: EmptyConfig,
    #[serde(rename = "outputAudioTranscription")]
    pub output_audio_transcription: EmptyConfig,
}

/// Fixed assistant persona for the live session, bound to the resolved
/// response language. The literal-transcription directive prevents the
/// model from transliterating user speech into another script.
fn system_instruction(language: Language) -> String {
    format!(
        "You are a friendly and helpful agricultural assistant for Indian farmers. \
         Your name is Mitra. The user's preferred language is {language}. Respond \
         exclusively in {language}. IMPORTANT: Transcribe the user's speech literally \
         in the language they are speaking. Do not transliterate their speech into a \
         different script.",
        language = language.name(),
    )
}

/// Build the setup message: audio-only responses, both transcriptions on,
/// voice pinned from the language table.
pub fn build_setup_message(model: &str, language: Language) -> SetupMessage {
    SetupMessage {
        setup: SetupPayload {
            model: format!("models/{model}"),
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::voice(language.voice())),
                ..Default::default()
            },
            system_instruction: Content::text(system_instruction(language)),
            input_audio_transcription: EmptyConfig {},
            output_audio_transcription: EmptyConfig {},
        },
    }
}

/// Realtime audio input frame
#[derive(Debug, Serialize)]
pub struct RealtimeInputMessage {
    #[serde(rename = "realtimeInput")]
    pub realtime_input: RealtimeInput,
}

#[derive(Debug, Serialize)]
pub struct RealtimeInput {
    #[serde(rename = "mediaChunks")]
    pub media_chunks: Vec<MediaChunk>,
}

#[derive(Debug, Serialize)]
pub struct MediaChunk {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Base64-encoded PCM
    pub data: String,
}

/// Wrap raw 16 kHz PCM bytes for the wire
pub fn build_audio_message(pcm: &[u8]) -> RealtimeInputMessage {
    RealtimeInputMessage {
        realtime_input: RealtimeInput {
            media_chunks: vec![MediaChunk {
                mime_type: INPUT_AUDIO_MIME.to_string(),
                data: BASE64.encode(pcm),
            }],
        },
    }
}

/// Signal the end of the microphone stream so the server flushes any
/// buffered input.
pub fn build_audio_stream_end_message() -> serde_json::Value {
    serde_json::json!({
        "realtimeInput": { "audioStreamEnd": true }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_message_wire_shape() {
        let msg = build_setup_message("gemini-2.5-flash-native-audio-preview-09-2025", Language::Hindi);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(
            json["setup"]["model"],
            "models/gemini-2.5-flash-native-audio-preview-09-2025"
        );
        assert_eq!(json["setup"]["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            json["setup"]["generationConfig"]["speechConfig"]["voiceConfig"]
                ["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
        assert_eq!(json["setup"]["inputAudioTranscription"], serde_json::json!({}));
        assert_eq!(json["setup"]["outputAudioTranscription"], serde_json::json!({}));
    }

    #[test]
    fn setup_instruction_binds_language_and_persona() {
        let msg = build_setup_message("m", Language::Marathi);
        let text = msg.setup.system_instruction.parts[0].text.as_deref().unwrap();
        assert!(text.contains("Mitra"));
        assert!(text.contains("Marathi"));
        assert!(text.contains("Do not transliterate"));
    }

    #[test]
    fn audio_message_encodes_base64() {
        let pcm = [0u8, 1, 2, 3, 4, 5];
        let msg = build_audio_message(&pcm);
        assert_eq!(msg.realtime_input.media_chunks.len(), 1);
        let chunk = &msg.realtime_input.media_chunks[0];
        assert_eq!(chunk.mime_type, INPUT_AUDIO_MIME);
        assert_eq!(BASE64.decode(&chunk.data).unwrap(), pcm);
    }

    #[test]
    fn audio_stream_end_wire_shape() {
        let json = serde_json::to_string(&build_audio_stream_end_message()).unwrap();
        assert!(json.contains("audioStreamEnd"));
        assert!(!json.contains("mediaChunks"));
    }
}
