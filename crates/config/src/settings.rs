//! Main settings module

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub genai: GenAiSettings,

    #[serde(default)]
    pub stores: StoreSettings,
}

impl Settings {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.genai.timeout_secs == 0 {
            return Err(ConfigError::Invalid("genai.timeout_secs must be non-zero".into()));
        }
        Ok(())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty means localhost-only
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            cors_enabled: true,
        }
    }
}

/// Model tiers and request knobs for the generative backend
///
/// The advisory flow uses `advisory_model` by default and switches to
/// `advisory_thinking_model` (with `thinking_budget` attached) only when the
/// caller opts into extended reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenAiSettings {
    #[serde(default = "default_advisory_model")]
    pub advisory_model: String,
    #[serde(default = "default_thinking_model")]
    pub advisory_thinking_model: String,
    /// Token budget for extended reasoning; only sent in thinking mode
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,
    #[serde(default = "default_weather_model")]
    pub weather_model: String,
    #[serde(default = "default_grounding_model")]
    pub grounding_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_live_model")]
    pub live_model: String,
    /// Transport-level request deadline; not a contract of the generators
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenAiSettings {
    fn default() -> Self {
        Self {
            advisory_model: default_advisory_model(),
            advisory_thinking_model: default_thinking_model(),
            thinking_budget: default_thinking_budget(),
            weather_model: default_weather_model(),
            grounding_model: default_grounding_model(),
            tts_model: default_tts_model(),
            live_model: default_live_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Mocked record stores (auth/feedback/SMS)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Directory for the JSON record files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_advisory_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_thinking_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_thinking_budget() -> u32 {
    8192
}

fn default_weather_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_grounding_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_live_model() -> String {
    "gemini-2.5-flash-native-audio-preview-09-2025".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_data_dir() -> String {
    "data".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.genai.advisory_model, "gemini-2.5-flash");
        assert_eq!(settings.genai.advisory_thinking_model, "gemini-2.5-pro");
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut settings = Settings::default();
        settings.genai.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "environment: production\nserver:\n  port: 9000\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.environment.is_production());
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.genai.timeout_secs, 60);
    }
}
