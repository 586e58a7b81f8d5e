//! Application state
//!
//! The credentialed client is constructed once at startup and shared by
//! reference with every generator; nothing here is a module-level global.
//! When the credential is absent the service still boots; every
//! generation endpoint then fails with the distinct credential error so
//! the UI can render setup instructions.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use krishi_advisor::{AdvisoryGenerator, SpeechGenerator, WeatherGenerator};
use krishi_config::Settings;
use krishi_genai::{GeminiClient, GenAiError, ModelTransport};
use krishi_store::{
    AuthStore, FeedbackStore, FileAuthStore, FileFeedbackStore, FileSmsService, SmsService,
    StoreError,
};

/// The generator set, present only when a credential was available
pub struct Generators {
    pub advisory: AdvisoryGenerator,
    pub weather: WeatherGenerator,
    pub speech: SpeechGenerator,
    /// Needed by the live session URL
    pub api_key: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    generators: Option<Arc<Generators>>,
    pub auth: Arc<dyn AuthStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub sms: Arc<dyn SmsService>,
}

impl AppState {
    /// Build state from the environment credential. A missing credential is
    /// not fatal here; it is surfaced per request with its distinct kind.
    pub fn from_env(settings: Settings) -> Result<Self, StoreError> {
        let timeout = Duration::from_secs(settings.genai.timeout_secs);
        let generators = match GeminiClient::from_env(timeout) {
            Ok(client) => {
                let api_key = client.api_key().to_string();
                let transport: Arc<dyn ModelTransport> = Arc::new(client);
                Some(Arc::new(Self::build_generators(&settings, transport, api_key)))
            }
            Err(GenAiError::CredentialMissing) => {
                tracing::warn!(
                    "{} - generation endpoints will return setup instructions",
                    GenAiError::CredentialMissing
                );
                None
            }
            Err(other) => {
                // Client construction only fails for credential or local
                // TLS/builder reasons; treat the rest as fatal-equivalent.
                tracing::error!(error = %other, "Failed to construct model client");
                None
            }
        };
        Self::assemble(settings, generators)
    }

    /// Build state around an explicit transport (tests, alternate clients)
    pub fn with_transport(
        settings: Settings,
        transport: Arc<dyn ModelTransport>,
        api_key: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let generators = Arc::new(Self::build_generators(&settings, transport, api_key.into()));
        Self::assemble(settings, Some(generators))
    }

    fn build_generators(
        settings: &Settings,
        transport: Arc<dyn ModelTransport>,
        api_key: String,
    ) -> Generators {
        Generators {
            advisory: AdvisoryGenerator::new(Arc::clone(&transport), settings.genai.clone()),
            weather: WeatherGenerator::new(
                Arc::clone(&transport),
                settings.genai.weather_model.clone(),
            ),
            speech: SpeechGenerator::new(
                Arc::clone(&transport),
                settings.genai.tts_model.clone(),
            ),
            api_key,
        }
    }

    fn assemble(
        settings: Settings,
        generators: Option<Arc<Generators>>,
    ) -> Result<Self, StoreError> {
        let data_dir = Path::new(&settings.stores.data_dir);
        Ok(Self {
            auth: Arc::new(FileAuthStore::open(data_dir.join("users.json"))?),
            feedback: Arc::new(FileFeedbackStore::open(data_dir.join("feedback.json"))?),
            sms: Arc::new(FileSmsService::open(data_dir.join("sms.json"))?),
            settings: Arc::new(settings),
            generators,
        })
    }

    /// The generator set, or the distinct credential error for the caller
    /// to surface verbatim.
    pub fn generators(&self) -> Result<&Arc<Generators>, GenAiError> {
        self.generators.as_ref().ok_or(GenAiError::CredentialMissing)
    }
}
