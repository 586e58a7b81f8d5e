//! Advisory request/response records and grounding context
//!
//! The response tree mirrors the advisory schema field for field. A parsed
//! advisory is constructed atomically from one model response, is immutable
//! afterwards, and is owned by the caller that requested it.

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Geographic coordinates, used as a geo-bias hint during grounding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One user submission of farm attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    /// Free-text land size, e.g. "5 acres" or "2 hectares"
    pub land_size: String,
    /// Free-text location, e.g. "Nashik, Maharashtra, India"
    pub location: String,
    pub soil_type: String,
    /// Primary irrigation source, e.g. "Drip Irrigation" or "Rain-fed"
    pub irrigation: String,
    /// Phone number for the advisory-ready notification
    pub phone_number: String,
    /// Output language for every generated string
    #[serde(default)]
    pub language: Language,
    /// Opt into the heavier extended-reasoning tier
    #[serde(default)]
    pub enable_thinking: bool,
    /// Device location, when the user granted it
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// A citation attached to grounded context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Market/location context retrieved ahead of generation
///
/// Produced fresh per request, never cached. Best-effort: a degraded
/// retrieval yields placeholder text and no sources, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedContext {
    pub text: String,
    pub sources: Vec<SourceRef>,
}

// ── Validated advisory output ──────────────────────────────────────

/// Rationale triple for the recommended crop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rationale {
    #[serde(default)]
    pub soil_suitability: String,
    #[serde(default)]
    pub crop_rotation: String,
    #[serde(default)]
    pub market_demand: String,
}

/// One soil improvement with its benefit and ordered how-to steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilImprovement {
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub benefit: String,
    #[serde(default)]
    pub how_to: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilHealthAssessment {
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub improvement_recommendations: Vec<SoilImprovement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestWindow {
    #[serde(default)]
    pub duration_days_range: String,
    #[serde(default)]
    pub season_window: String,
    #[serde(default)]
    pub assumptions: String,
}

/// Fixed-key expense breakdown (all amounts in the advisory currency)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    #[serde(default)]
    pub seeds: f64,
    #[serde(default)]
    pub land_preparation: f64,
    #[serde(default)]
    pub fertilizer_and_nutrients: f64,
    #[serde(default)]
    pub irrigation_and_water: f64,
    #[serde(default)]
    pub labor: f64,
    #[serde(default)]
    pub pest_and_disease_control: f64,
    #[serde(default)]
    pub harvesting_and_transport: f64,
    #[serde(default)]
    pub miscellaneous: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseEstimate {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub amount: f64,
    #[serde(default)]
    pub breakdown: ExpenseBreakdown,
    #[serde(default)]
    pub unit_cost_basis: String,
    #[serde(default)]
    pub assumptions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrigationSchedule {
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub seasonal_adjustments: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedYield {
    #[serde(default)]
    pub value_range_per_acre: String,
    #[serde(default = "default_yield_unit")]
    pub unit: String,
    #[serde(default)]
    pub assumptions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmGatePrice {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub price_per_quintal_assumed: f64,
    #[serde(default)]
    pub assumptions: String,
}

/// Formatted money range, e.g. "₹45,000 - ₹60,000".
///
/// Kept as model-authored text by contract; see `ranges` for the
/// display-side best-effort numeric extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyRange {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub amount_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitabilityProjection {
    pub expected_yield: ExpectedYield,
    pub farm_gate_price: FarmGatePrice,
    pub gross_revenue_for_user_land: MoneyRange,
    /// May be negative when costs exceed revenue
    pub net_profit_for_user_land: MoneyRange,
    #[serde(default)]
    pub roi_percentage_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PestEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub management: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FertilizerStage {
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub fertilizer: String,
    #[serde(default)]
    pub dosage_per_acre: String,
    #[serde(default)]
    pub application_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marketplace {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub why_suitable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

/// The validated structured advisory
///
/// Every top-level field listed as required in the advisory schema is
/// non-optional here; deserialization fails if the model omits one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropAdvisory {
    pub suggested_crop_for_cultivation: String,
    pub why: Rationale,
    pub soil_health_assessment: SoilHealthAssessment,
    pub time_to_complete_harvest: HarvestWindow,
    pub estimated_total_expense_for_user_land: ExpenseEstimate,
    pub irrigation_schedule: IrrigationSchedule,
    pub profitability_projection: ProfitabilityProjection,
    pub pest_and_disease_management: Vec<PestEntry>,
    pub fertilizer_recommendations: Vec<FertilizerStage>,
    pub recommended_marketplaces: Vec<Marketplace>,
    /// Present in the schema but not required; defaults to empty
    #[serde(default)]
    pub key_practices_for_success: Vec<String>,
    pub warnings_and_constraints: Vec<String>,
    pub data_gaps_and_assumptions: Vec<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_yield_unit() -> String {
    "quintals per acre".to_string()
}
