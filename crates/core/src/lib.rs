//! Core types for the crop advisory service
//!
//! This crate provides foundational types used across all other crates:
//! - Advisory request/response records and grounding context
//! - The structured-output schema trees (advisory, weather)
//! - Language definitions for the supported UI locales
//! - Weather forecast types with the closed icon contract
//! - Error types

pub mod advisory;
pub mod error;
pub mod language;
pub mod ranges;
pub mod schema;
pub mod weather;

pub use advisory::{
    AdvisoryRequest, Coordinates, CropAdvisory, ExpectedYield, ExpenseBreakdown, ExpenseEstimate,
    FarmGatePrice, FertilizerStage, GroundedContext, HarvestWindow, IrrigationSchedule,
    Marketplace, MoneyRange, PestEntry, ProfitabilityProjection, Rationale, SoilHealthAssessment,
    SoilImprovement, SourceRef,
};
pub use error::{Error, Result};
pub use language::{voice_for_locale, Language, DEFAULT_VOICE};
pub use ranges::{parse_money_range, NumericRange};
pub use schema::{advisory_schema, validate, weather_schema, SchemaKind, SchemaNode, SchemaViolation};
pub use weather::{CurrentConditions, DailyForecast, WeatherForecast, WeatherIcon};
