//! Prompt composition
//!
//! Prompts are composed deterministically from the request, the grounded
//! context, and a fixed decision policy, so the same inputs always produce
//! the same prompt text.

use krishi_core::{AdvisoryRequest, GroundedContext, Language, WeatherIcon};

/// Builds the advisory generation prompt.
///
/// Section order is fixed: role, language directive, grounded context,
/// user data, decision policy, output discipline. The decision policy puts
/// climate/irrigation feasibility ahead of economics on purpose: the
/// model must rule a crop in before costing it.
pub struct AdvisoryPromptBuilder<'a> {
    request: &'a AdvisoryRequest,
    context: &'a GroundedContext,
}

impl<'a> AdvisoryPromptBuilder<'a> {
    pub fn new(request: &'a AdvisoryRequest, context: &'a GroundedContext) -> Self {
        Self { request, context }
    }

    pub fn build(&self) -> String {
        let language = self.request.language.name();
        let req = self.request;

        format!(
            r#"You are an expert agricultural advisor. Based on the following user-provided data, generate a comprehensive and actionable crop advisory.
The user is located in a region where the currency is Indian Rupees (INR). All financial figures must be in INR.

## Language
Write every natural-language string value in {language}, recursively, at every nesting level. JSON keys stay exactly as defined by the schema and must not be translated.

## Local Market Context
The following context was retrieved from current web and map sources. Ground all price and demand estimates in it; do not invent market figures.
{context}

## User Data
- Land Size: {land_size}
- Location: {location}
- Soil Type: {soil_type}
- Primary Irrigation Source: {irrigation}

## Decision Policy (apply in this order)
1. Climate and irrigation feasibility come before economics. The recommended crop's water requirement must be realistically satisfiable by the stated irrigation source in the local climate. If the farm is rain-fed in an arid or semi-arid region, restrict candidates to drought-tolerant crops.
2. If you recommend a water-intensive crop, include an explicit justification tied to the stated irrigation source.
3. Price and demand estimates must come from the market context above, not from assumption. Profitability may be negative; never assume a profit exists.
4. Compute all monetary figures against the stated land size, normalizing common area units (acres, hectares, bigha, guntha) to acres first.
5. Name the recommended crop by its proper {language} common name, not a transliteration.

## Output
Respond only with JSON conforming to the provided schema. Do not include introductory text, markdown fences, or anything outside the JSON structure.
Calculate the total expenses and revenue for the full {land_size}."#,
            language = language,
            context = self.context.text,
            land_size = req.land_size,
            location = req.location,
            soil_type = req.soil_type,
            irrigation = req.irrigation,
        )
    }
}

/// Grounding-stage research prompt (free text, search-tool augmented)
pub fn grounding_prompt(location: &str, interest: Option<&str>) -> String {
    let focus = match interest {
        Some(crops) => format!(" Pay particular attention to these crops: {crops}."),
        None => String::new(),
    };
    format!(
        "Research current agricultural market conditions around {location}: \
         prevailing farm-gate prices for the main crops, current demand trends, \
         and the significant mandis and marketplaces serving the region.{focus} \
         Summarize in one short paragraph suitable as grounding context for an \
         advisory. Use web search and map search; cite your sources."
    )
}

/// Weather generation prompt.
///
/// The icon contract is enumerated here in full; the schema constrains the
/// field to a string, so the closed set and the condition mapping rules are
/// carried by the prompt.
pub fn weather_prompt(location: &str, language: Language) -> String {
    let icons = WeatherIcon::all_names().join(", ");
    format!(
        r#"Provide the current weather and a 5-day forecast for {location}.
Temperatures are in degrees Celsius. Write the "condition" strings in {language}.
The "icon" field must be exactly one of: {icons}.
Map conditions to icons as follows: clear skies -> Sunny; some cloud or haze -> PartlyCloudy; overcast -> Cloudy; drizzle, showers or rain -> Rain; storms with lightning -> Thunderstorm; snow or sleet -> Snow; strong winds or dust -> Windy.
Respond only with JSON conforming to the provided schema."#,
        location = location,
        language = language.name(),
        icons = icons,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use krishi_core::GroundedContext;

    fn request() -> AdvisoryRequest {
        AdvisoryRequest {
            land_size: "5 acres".to_string(),
            location: "Nashik, Maharashtra, India".to_string(),
            soil_type: "Alluvial".to_string(),
            irrigation: "Drip Irrigation".to_string(),
            phone_number: "+919999999999".to_string(),
            language: Language::English,
            enable_thinking: false,
            coordinates: None,
        }
    }

    fn context() -> GroundedContext {
        GroundedContext { text: "Onion demand is strong at Lasalgaon.".to_string(), sources: vec![] }
    }

    #[test]
    fn prompt_contains_literal_user_inputs() {
        let ctx = context();
        let req = request();
        let prompt = AdvisoryPromptBuilder::new(&req, &ctx).build();
        for literal in ["5 acres", "Nashik, Maharashtra, India", "Alluvial", "Drip Irrigation"] {
            assert!(prompt.contains(literal), "missing literal {literal:?}");
        }
    }

    #[test]
    fn prompt_embeds_grounded_context() {
        let ctx = context();
        let req = request();
        let prompt = AdvisoryPromptBuilder::new(&req, &ctx).build();
        assert!(prompt.contains("Onion demand is strong at Lasalgaon."));
    }

    #[test]
    fn climate_rule_precedes_economics() {
        let ctx = context();
        let req = request();
        let prompt = AdvisoryPromptBuilder::new(&req, &ctx).build();
        let climate = prompt.find("Climate and irrigation feasibility").unwrap();
        let prices = prompt.find("Price and demand estimates").unwrap();
        assert!(climate < prices);
    }

    #[test]
    fn prompt_carries_language_directive() {
        let ctx = context();
        let mut req = request();
        req.language = Language::Marathi;
        let prompt = AdvisoryPromptBuilder::new(&req, &ctx).build();
        assert!(prompt.contains("in Marathi"));
        assert!(prompt.contains("must not be translated"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let ctx = context();
        let req = request();
        let first = AdvisoryPromptBuilder::new(&req, &ctx).build();
        let second = AdvisoryPromptBuilder::new(&req, &ctx).build();
        assert_eq!(first, second);
    }

    #[test]
    fn weather_prompt_enumerates_all_icons() {
        let prompt = weather_prompt("Nashik", Language::Hindi);
        for icon in WeatherIcon::all_names() {
            assert!(prompt.contains(icon));
        }
        assert!(prompt.contains("Hindi"));
    }

    #[test]
    fn grounding_prompt_biases_toward_interest() {
        let prompt = grounding_prompt("Nashik", Some("onion, grapes"));
        assert!(prompt.contains("onion, grapes"));
        assert!(grounding_prompt("Nashik", None).contains("Nashik"));
    }
}
