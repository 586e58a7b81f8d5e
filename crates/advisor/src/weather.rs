//! Weather forecast generation
//!
//! Single-stage: no grounding, fixed lighter tier. Unlike the advisory
//! flow there is no sensible degraded fallback for weather, so failures
//! propagate to the caller.

use std::sync::Arc;

use krishi_core::{weather_schema, Language, WeatherForecast};
use krishi_genai::wire::{Content, GenerateContentRequest, GenerationConfig, Schema};
use krishi_genai::{convert, GenAiError, ModelTransport};

use crate::json::parse_structured;
use crate::prompt::weather_prompt;

/// Generates location forecasts
pub struct WeatherGenerator {
    transport: Arc<dyn ModelTransport>,
    model: String,
    response_schema: Schema,
}

impl WeatherGenerator {
    pub fn new(transport: Arc<dyn ModelTransport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
            response_schema: convert(weather_schema()),
        }
    }

    /// Fetch a forecast. Single attempt; empty and malformed responses are
    /// surfaced with their distinct error kinds.
    pub async fn forecast(
        &self,
        location: &str,
        language: Language,
    ) -> Result<WeatherForecast, GenAiError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(weather_prompt(location, language))],
            system_instruction: None,
            tools: None,
            tool_config: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(self.response_schema.clone()),
                ..Default::default()
            }),
        };

        tracing::info!(model = %self.model, location, "Generating weather forecast");
        let response = self.transport.generate_content(&self.model, request).await?;
        let value = parse_structured(&response.text(), weather_schema())?;
        serde_json::from_value(value).map_err(|e| GenAiError::MalformedModelOutput(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::testing::StubTransport;
    use krishi_core::WeatherIcon;

    fn forecast_json() -> String {
        serde_json::json!({
            "current": {"temperature": 31.0, "condition": "Clear", "icon": "Sunny"},
            "daily": [
                {"day": "Mon", "high_temp": 33.0, "low_temp": 22.0,
                 "condition": "Clear", "icon": "Sunny"},
                {"day": "Tue", "high_temp": 30.0, "low_temp": 21.0,
                 "condition": "Showers", "icon": "Rain"}
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn forecast_round_trip() {
        let transport = Arc::new(StubTransport::new(vec![Ok(StubTransport::text_body(
            &forecast_json(),
        ))]));
        let generator = WeatherGenerator::new(transport.clone(), "gemini-2.5-flash");

        let forecast = generator.forecast("Nashik", Language::English).await.unwrap();
        assert_eq!(forecast.current.icon, WeatherIcon::Sunny);
        assert_eq!(forecast.daily.len(), 2);

        let calls = transport.calls.lock().unwrap();
        let prompt = calls[0].1["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Thunderstorm"), "prompt must enumerate the icon set");
        assert_eq!(calls[0].1["generationConfig"]["responseMimeType"], "application/json");
    }

    #[tokio::test]
    async fn empty_response_is_distinct_error() {
        let transport = Arc::new(StubTransport::new(vec![Ok(StubTransport::text_body(""))]));
        let generator = WeatherGenerator::new(transport.clone(), "gemini-2.5-flash");
        let err = generator.forecast("Nashik", Language::English).await.unwrap_err();
        assert!(matches!(err, GenAiError::EmptyModelResponse));
    }

    #[tokio::test]
    async fn unknown_icon_violates_the_contract() {
        let body = serde_json::json!({
            "current": {"temperature": 31.0, "condition": "Hail", "icon": "Hail"},
            "daily": []
        })
        .to_string();
        let transport =
            Arc::new(StubTransport::new(vec![Ok(StubTransport::text_body(&body))]));
        let generator = WeatherGenerator::new(transport.clone(), "gemini-2.5-flash");
        let err = generator.forecast("Nashik", Language::English).await.unwrap_err();
        assert!(matches!(err, GenAiError::MalformedModelOutput(_)));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let transport = Arc::new(StubTransport::new(vec![Err(GenAiError::RateLimited)]));
        let generator = WeatherGenerator::new(transport.clone(), "gemini-2.5-flash");
        let err = generator.forecast("Nashik", Language::English).await.unwrap_err();
        assert!(matches!(err, GenAiError::RateLimited));
    }
}
