//! Inbound server message parsing
//!
//! A single server frame can carry several events at once (audio chunks
//! plus a transcription, a transcription plus turn completion), so parsing
//! yields a list.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// One event received from the live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    /// Server accepted the setup frame; streaming may begin
    SetupComplete,
    /// Partial transcript of the user's speech
    InputTranscript { text: String },
    /// Partial transcript of the model's speech
    OutputTranscript { text: String },
    /// Synthesized audio chunk (24 kHz mono PCM)
    Audio { data: Vec<u8> },
    /// The current exchange is finished; buffers should commit
    TurnComplete,
    /// User barge-in: all queued playback must be cancelled
    Interrupted,
    Error { message: String },
}

/// Parse one JSON frame into events.
pub fn parse_server_message(json_text: &str) -> Vec<LiveEvent> {
    let mut events = Vec::new();

    let value: serde_json::Value = match serde_json::from_str(json_text) {
        Ok(v) => v,
        Err(e) => {
            events.push(LiveEvent::Error {
                message: format!("Failed to parse server message: {e}"),
            });
            return events;
        }
    };

    if value.get("setupComplete").is_some() {
        events.push(LiveEvent::SetupComplete);
    }

    if let Some(content) = value.get("serverContent") {
        if content.get("turnComplete").and_then(|v| v.as_bool()) == Some(true) {
            events.push(LiveEvent::TurnComplete);
        }
        if content.get("interrupted").and_then(|v| v.as_bool()) == Some(true) {
            events.push(LiveEvent::Interrupted);
        }
        if let Some(parts) = content.pointer("/modelTurn/parts").and_then(|v| v.as_array()) {
            for part in parts {
                if let Some(data_b64) = part.pointer("/inlineData/data").and_then(|v| v.as_str()) {
                    if let Ok(data) = BASE64.decode(data_b64) {
                        events.push(LiveEvent::Audio { data });
                    }
                }
            }
        }
        push_transcript(content, "inputTranscription", &mut events, true);
        push_transcript(content, "outputTranscription", &mut events, false);
    }

    // Some server revisions emit transcriptions at the top level.
    push_transcript(&value, "inputTranscription", &mut events, true);
    push_transcript(&value, "outputTranscription", &mut events, false);

    if let Some(err) = value.get("error") {
        let message = err
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown server error");
        events.push(LiveEvent::Error { message: message.to_string() });
    }

    events
}

fn push_transcript(value: &serde_json::Value, key: &str, events: &mut Vec<LiveEvent>, input: bool) {
    if let Some(text) = value.pointer(&format!("/{key}/text")).and_then(|v| v.as_str()) {
        if !text.is_empty() {
            events.push(if input {
                LiveEvent::InputTranscript { text: text.to_string() }
            } else {
                LiveEvent::OutputTranscript { text: text.to_string() }
            });
        }
    }
}
