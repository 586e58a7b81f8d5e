//! Grounding retrieval
//!
//! A preliminary, unstructured, tool-augmented query that fetches a short
//! market/location context paragraph plus citations. Grounding is an
//! enhancement, not a correctness requirement: every failure in this stage
//! is absorbed and downgraded to a neutral placeholder so the advisory flow
//! always proceeds.

use std::sync::Arc;

use krishi_core::{Coordinates, GroundedContext};
use krishi_genai::wire::{GenerateContentRequest, Tool, ToolConfig};
use krishi_genai::{GenAiError, ModelTransport};

use crate::prompt::grounding_prompt;

/// Placeholder context substituted when retrieval fails or returns nothing
pub const NEUTRAL_CONTEXT: &str = "no specific local data found";

/// Best-effort market/location context retriever
pub struct GroundingRetriever {
    transport: Arc<dyn ModelTransport>,
    model: String,
}

impl GroundingRetriever {
    pub fn new(transport: Arc<dyn ModelTransport>, model: impl Into<String>) -> Self {
        Self { transport, model: model.into() }
    }

    /// Retrieve grounding context for a location.
    ///
    /// Never fails: network, provider, and parsing errors all collapse to
    /// the neutral placeholder with an empty source list. Results are
    /// produced fresh per request and never cached.
    pub async fn retrieve(
        &self,
        location: &str,
        coordinates: Option<Coordinates>,
        interest: Option<&str>,
    ) -> GroundedContext {
        match self.try_retrieve(location, coordinates, interest).await {
            Ok(context) => context,
            Err(error) => {
                tracing::warn!(%location, %error, "Grounding degraded to neutral context");
                GroundedContext { text: NEUTRAL_CONTEXT.to_string(), sources: Vec::new() }
            }
        }
    }

    async fn try_retrieve(
        &self,
        location: &str,
        coordinates: Option<Coordinates>,
        interest: Option<&str>,
    ) -> Result<GroundedContext, GenAiError> {
        let request = GenerateContentRequest {
            tools: Some(vec![Tool::google_search(), Tool::google_maps()]),
            tool_config: coordinates.map(|c| ToolConfig::geo_bias(c.latitude, c.longitude)),
            ..GenerateContentRequest::from_text(grounding_prompt(location, interest))
        };

        let response = self.transport.generate_content(&self.model, request).await?;
        let sources = response.sources();
        let text = response.text().trim().to_string();

        Ok(GroundedContext {
            text: if text.is_empty() { NEUTRAL_CONTEXT.to_string() } else { text },
            sources,
        })
    }
}
