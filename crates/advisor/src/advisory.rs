//! Crop advisory generation
//!
//! The two-stage pipeline: grounding retrieval, then schema-constrained
//! generation. Grounding must complete (successfully or degraded) before
//! the generation prompt is composed; the ordering is a guarantee, not an
//! optimization.

use std::sync::Arc;

use krishi_config::GenAiSettings;
use krishi_core::{advisory_schema, AdvisoryRequest, CropAdvisory, SourceRef};
use krishi_genai::wire::{
    Content, GenerateContentRequest, GenerationConfig, Schema, ThinkingConfig,
};
use krishi_genai::{convert, GenAiError, ModelTransport};

use crate::grounding::GroundingRetriever;
use crate::json::parse_structured;
use crate::prompt::AdvisoryPromptBuilder;

/// A validated advisory paired with the grounding-stage citations
#[derive(Debug, Clone)]
pub struct AdvisoryOutcome {
    pub advisory: CropAdvisory,
    /// Sources captured during grounding, not generation
    pub sources: Vec<SourceRef>,
}

/// Generates crop advisories
pub struct AdvisoryGenerator {
    transport: Arc<dyn ModelTransport>,
    grounding: GroundingRetriever,
    settings: GenAiSettings,
    // Converted once; the schema tree is immutable and conversion is pure.
    response_schema: Schema,
}

impl AdvisoryGenerator {
    /// The credential was already resolved when `transport` was built; a
    /// missing credential fails there, before any generator exists.
    pub fn new(transport: Arc<dyn ModelTransport>, settings: GenAiSettings) -> Self {
        let grounding =
            GroundingRetriever::new(Arc::clone(&transport), settings.grounding_model.clone());
        Self {
            transport,
            grounding,
            settings,
            response_schema: convert(advisory_schema()),
        }
    }

    /// Generate an advisory for one request. Single attempt: retry policy
    /// is a caller concern.
    pub async fn generate(
        &self,
        request: &AdvisoryRequest,
    ) -> Result<AdvisoryOutcome, GenAiError> {
        let context = self
            .grounding
            .retrieve(&request.location, request.coordinates, None)
            .await;

        let prompt = AdvisoryPromptBuilder::new(request, &context).build();

        let (model, thinking_config) = if request.enable_thinking {
            (
                self.settings.advisory_thinking_model.as_str(),
                Some(ThinkingConfig { thinking_budget: self.settings.thinking_budget }),
            )
        } else {
            (self.settings.advisory_model.as_str(), None)
        };

        tracing::info!(
            model,
            location = %request.location,
            thinking = request.enable_thinking,
            grounded_sources = context.sources.len(),
            "Generating crop advisory"
        );

        let wire_request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            tools: None,
            tool_config: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(self.response_schema.clone()),
                thinking_config,
                ..Default::default()
            }),
        };

        let response = self.transport.generate_content(model, wire_request).await?;
        let value = parse_structured(&response.text(), advisory_schema())?;
        let advisory: CropAdvisory = serde_json::from_value(value)
            .map_err(|e| GenAiError::MalformedModelOutput(e.to_string()))?;

        Ok(AdvisoryOutcome { advisory, sources: context.sources })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared stub transport for generator tests

    use super::*;
    use async_trait::async_trait;
    use krishi_genai::wire::GenerateContentResponse;
    use std::sync::Mutex;

    /// Pops one canned result per call and records `(model, request_json)`
    pub struct StubTransport {
        responses: Mutex<Vec<Result<GenerateContentResponse, GenAiError>>>,
        pub calls: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl StubTransport {
        pub fn new(bodies: Vec<Result<String, GenAiError>>) -> Self {
            let mut responses: Vec<_> = bodies
                .into_iter()
                .map(|body| body.map(|json| serde_json::from_str(&json).unwrap()))
                .collect();
            responses.reverse(); // popped back-to-front
            Self { responses: Mutex::new(responses), calls: Mutex::new(Vec::new()) }
        }

        /// A response whose single candidate carries `text`
        pub fn text_body(text: &str) -> String {
            serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            })
            .to_string()
        }
    }

    #[async_trait]
    impl ModelTransport for StubTransport {
        async fn generate_content(
            &self,
            model: &str,
            request: GenerateContentRequest,
        ) -> Result<GenerateContentResponse, GenAiError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), serde_json::to_value(&request).unwrap()));
            self.responses.lock().unwrap().pop().expect("unexpected extra call")
        }
    }

    /// A complete advisory payload satisfying every required field
    pub fn sample_advisory_json() -> String {
        serde_json::json!({
            "suggested_crop_for_cultivation": "Onion",
            "why": {
                "soil_suitability": "Alluvial soil drains well for bulb crops.",
                "crop_rotation": "Breaks the cereal cycle common in the region.",
                "market_demand": "Strong mandi demand around Lasalgaon."
            },
            "soil_health_assessment": {
                "assessment": "Good structure, slightly low organic carbon.",
                "improvement_recommendations": [{
                    "recommendation": "Apply farmyard manure before planting",
                    "benefit": "Raises organic carbon and water retention",
                    "how_to": ["Spread 8 tonnes per acre", "Incorporate with shallow tillage"]
                }]
            },
            "time_to_complete_harvest": {
                "duration_days_range": "100-120 days",
                "season_window": "Rabi, October sowing",
                "assumptions": "Timely sowing and normal winter"
            },
            "estimated_total_expense_for_user_land": {
                "currency": "INR",
                "amount": 225000.0,
                "breakdown": {
                    "seeds": 25000.0,
                    "land_preparation": 30000.0,
                    "fertilizer_and_nutrients": 40000.0,
                    "irrigation_and_water": 20000.0,
                    "labor": 60000.0,
                    "pest_and_disease_control": 20000.0,
                    "harvesting_and_transport": 20000.0,
                    "miscellaneous": 10000.0
                },
                "unit_cost_basis": "45,000 INR per acre",
                "assumptions": "Drip system already installed"
            },
            "irrigation_schedule": {
                "frequency": "Every 3-4 days",
                "method": "Drip",
                "seasonal_adjustments": "Reduce after bulb maturity",
                "notes": "Avoid waterlogging"
            },
            "profitability_projection": {
                "expected_yield": {
                    "value_range_per_acre": "80-110",
                    "unit": "quintals per acre",
                    "assumptions": "Average season"
                },
                "farm_gate_price": {
                    "currency": "INR",
                    "price_per_quintal_assumed": 1400.0,
                    "assumptions": "Recent Lasalgaon modal price"
                },
                "gross_revenue_for_user_land": {
                    "currency": "INR", "amount_range": "₹5,60,000 - ₹7,70,000"
                },
                "net_profit_for_user_land": {
                    "currency": "INR", "amount_range": "₹3,35,000 - ₹5,45,000"
                },
                "roi_percentage_range": "148% - 242%"
            },
            "pest_and_disease_management": [{
                "name": "Thrips",
                "type": "pest",
                "symptoms": "Silvery streaks on leaves",
                "management": ["Blue sticky traps", "Neem oil spray"]
            }],
            "fertilizer_recommendations": [{
                "stage": "Basal",
                "fertilizer": "NPK 10:26:26",
                "dosage_per_acre": "100 kg",
                "application_notes": "Before transplanting"
            }],
            "recommended_marketplaces": [{
                "name": "Lasalgaon APMC",
                "type": "mandi",
                "region": "Nashik",
                "why_suitable": "Largest onion market in Asia",
                "contact_phone": "+912550123456"
            }],
            "key_practices_for_success": ["Grade bulbs before sale"],
            "warnings_and_constraints": ["Price volatility near harvest glut"],
            "data_gaps_and_assumptions": ["Soil test report not provided"]
        })
        .to_string()
    }
}
