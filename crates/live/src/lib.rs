//! Live voice conversation against the model provider
//!
//! A full-duplex session: microphone PCM goes up, synthesized audio and
//! transcripts come back. The pieces:
//!
//! - [`protocol`]: setup/audio wire messages for the Live endpoint
//! - [`events`]: inbound server messages parsed into [`LiveEvent`]s
//! - [`session`]: the WebSocket connection and its in/out pump tasks
//! - [`turns`]: transcript delta buffering and per-turn history commits
//! - [`playback`]: gapless, ordered scheduling of inbound audio chunks
//! - [`bridge`]: the state machine tying it together, with idempotent
//!   teardown and categorized failures

pub mod bridge;
pub mod events;
pub mod playback;
pub mod protocol;
pub mod session;
pub mod turns;

pub use bridge::{BridgeEvent, BridgeState, ConversationBridge};
pub use events::{parse_server_message, LiveEvent};
pub use playback::{pcm_duration_secs, PlaybackScheduler, OUTPUT_SAMPLE_RATE};
pub use session::{LiveSession, OutboundMessage};
pub use turns::{Speaker, TranscriptEntry, TurnBuffer};

use thiserror::Error;

/// Live-session errors, categorized so the caller can pick a specific
/// recovery affordance (setup panel, key re-entry, permission prompt).
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("API_KEY environment variable is not configured")]
    CredentialMissing,

    #[error("API key rejected by the provider: {0}")]
    CredentialInvalid(String),

    #[error("Microphone permission denied")]
    MicrophonePermissionDenied,

    #[error("Session is not active")]
    NotActive,

    #[error("A session is already active")]
    AlreadyActive,

    #[error("Live transport error: {0}")]
    Transport(String),
}

impl From<krishi_genai::GenAiError> for BridgeError {
    fn from(err: krishi_genai::GenAiError) -> Self {
        use krishi_genai::GenAiError;
        match err {
            GenAiError::CredentialMissing => BridgeError::CredentialMissing,
            GenAiError::CredentialInvalid(message) => BridgeError::CredentialInvalid(message),
            other => BridgeError::Transport(other.to_string()),
        }
    }
}

impl From<BridgeError> for krishi_core::Error {
    fn from(err: BridgeError) -> Self {
        krishi_core::Error::Live(err.to_string())
    }
}
