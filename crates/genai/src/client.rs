//! Credential gate and HTTP client
//!
//! One client instance holds the transport credential and is constructed
//! once at application start, then passed by reference to every generator.
//! The instance is stateless beyond the credential and safe for concurrent
//! use; it is never mutated after construction.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::wire::{GenerateContentRequest, GenerateContentResponse};
use crate::GenAiError;

/// Primary credential variable
pub const CREDENTIAL_ENV: &str = "GEMINI_API_KEY";

/// Legacy fallback credential variable
pub const CREDENTIAL_ENV_FALLBACK: &str = "API_KEY";

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The single remote capability the generators depend on: submit a prompt
/// (plus optional schema/tool config), receive text or structured data.
///
/// Generators take `Arc<dyn ModelTransport>` so tests can substitute a stub.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError>;
}

/// Gemini REST client
#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    /// Build a client from the process environment.
    ///
    /// Reads [`CREDENTIAL_ENV`], falling back to [`CREDENTIAL_ENV_FALLBACK`].
    /// A blank or missing value fails fast with [`GenAiError::CredentialMissing`]
    /// before any network activity.
    pub fn from_env(timeout: Duration) -> Result<Self, GenAiError> {
        let api_key = read_env(CREDENTIAL_ENV)
            .or_else(|| read_env(CREDENTIAL_ENV_FALLBACK))
            .ok_or(GenAiError::CredentialMissing)?;
        Self::new(api_key, timeout)
    }

    /// Build a client with an explicit credential
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, GenAiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenAiError::CredentialMissing);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenAiError::Network(e.to_string()))?;
        Ok(Self { http, api_key, endpoint: DEFAULT_ENDPOINT.to_string() })
    }

    /// Override the API endpoint (tests, proxies)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The transport credential, needed by the live session URL
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Map a non-success HTTP status to the error taxonomy.
///
/// 429 is surfaced distinctly so callers can offer a retry affordance;
/// credential rejections are surfaced distinctly so callers can prompt for
/// re-entry rather than showing a generic failure.
fn map_status(status: u16, body: String) -> GenAiError {
    if status == 429 {
        return GenAiError::RateLimited;
    }
    let lowered = body.to_lowercase();
    if matches!(status, 400 | 401 | 403)
        && (lowered.contains("api key") || lowered.contains("api_key_invalid"))
    {
        return GenAiError::CredentialInvalid(body);
    }
    GenAiError::Api { status, message: body }
}

#[async_trait]
impl ModelTransport for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, model);
        tracing::debug!(model, "Calling generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(model, status = status.as_u16(), "generateContent failed");
            return Err(map_status(status.as_u16(), body));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GenAiError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credential_is_rejected_before_any_call() {
        let err = GeminiClient::new("", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, GenAiError::CredentialMissing));
        let err = GeminiClient::new("   ", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, GenAiError::CredentialMissing));
    }

    #[test]
    fn from_env_honors_both_variables() {
        // Single test body: env mutation must not race across tests.
        std::env::remove_var(CREDENTIAL_ENV);
        std::env::remove_var(CREDENTIAL_ENV_FALLBACK);
        let err = GeminiClient::from_env(Duration::from_secs(5)).unwrap_err();
        assert_eq!(err.to_string(), "API_KEY environment variable is not configured");

        std::env::set_var(CREDENTIAL_ENV_FALLBACK, "legacy-key");
        let client = GeminiClient::from_env(Duration::from_secs(5)).unwrap();
        assert_eq!(client.api_key(), "legacy-key");

        std::env::set_var(CREDENTIAL_ENV, "primary-key");
        let client = GeminiClient::from_env(Duration::from_secs(5)).unwrap();
        assert_eq!(client.api_key(), "primary-key");

        std::env::remove_var(CREDENTIAL_ENV);
        std::env::remove_var(CREDENTIAL_ENV_FALLBACK);
    }

    #[test]
    fn rate_limit_maps_to_distinct_kind() {
        assert!(matches!(map_status(429, String::new()), GenAiError::RateLimited));
    }

    #[test]
    fn invalid_key_maps_to_credential_invalid() {
        let err = map_status(400, "API key not valid. Please pass a valid API key.".into());
        assert!(matches!(err, GenAiError::CredentialInvalid(_)));
        let err = map_status(403, r#"{"error": {"status": "API_KEY_INVALID"}}"#.into());
        assert!(matches!(err, GenAiError::CredentialInvalid(_)));
    }

    #[test]
    fn other_statuses_map_to_api_error() {
        let err = map_status(500, "internal".into());
        assert!(matches!(err, GenAiError::Api { status: 500, .. }));
        // A 400 without a credential complaint stays generic
        let err = map_status(400, "invalid argument: contents".into());
        assert!(matches!(err, GenAiError::Api { status: 400, .. }));
    }
}
