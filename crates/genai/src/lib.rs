//! Gemini transport layer
//!
//! Provides:
//! - The credential gate and the shared, construct-once client
//! - Request/response wire types for the generateContent surface
//! - Conversion from the provider-agnostic schema trees to the provider
//!   dialect
//!
//! Policy: one attempt per invocation. Retries and deadlines beyond the
//! transport timeout are a caller concern, never added here.

pub mod client;
pub mod schema;
pub mod wire;

pub use client::{GeminiClient, ModelTransport, CREDENTIAL_ENV, CREDENTIAL_ENV_FALLBACK};
pub use schema::convert;
pub use wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData,
    LatLng, Part, Schema, SchemaType, SpeechConfig, ThinkingConfig, Tool, ToolConfig,
};

use thiserror::Error;

/// Generative-backend errors
///
/// The `CredentialMissing` display text is a contract: callers match on it
/// verbatim to render credential-setup instructions instead of a generic
/// failure banner.
#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("API_KEY environment variable is not configured")]
    CredentialMissing,

    #[error("API key rejected by the provider: {0}")]
    CredentialInvalid(String),

    #[error("API rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model returned an empty response")]
    EmptyModelResponse,

    #[error("Model output does not match the expected shape: {0}")]
    MalformedModelOutput(String),

    #[error("Speech response carried no audio payload")]
    NoAudioData,
}

impl From<reqwest::Error> for GenAiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenAiError::Timeout
        } else {
            GenAiError::Network(err.to_string())
        }
    }
}

impl From<GenAiError> for krishi_core::Error {
    fn from(err: GenAiError) -> Self {
        krishi_core::Error::GenAi(err.to_string())
    }
}
