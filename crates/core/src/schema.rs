//! Structured-output schema trees
//!
//! Declares the exact shape of the two structured model outputs (crop
//! advisory, weather forecast) as pure data. The trees are built once and
//! shared process-wide; consumers must treat them as immutable.
//!
//! The node grammar is a closed tagged union matched exhaustively by the
//! provider-dialect converter; adding a new kind is a compile-time change,
//! not a runtime error.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;

/// The six schema kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Recursive schema descriptor
///
/// Invariants (upheld by construction):
/// - an `Object` owns its ordered `properties` and a `required` list that is
///   a subset of the property keys
/// - an `Array` owns exactly one `items` node
#[derive(Debug, Clone)]
pub enum SchemaNode {
    String {
        description: Option<&'static str>,
        default: Option<&'static str>,
    },
    Number {
        description: Option<&'static str>,
    },
    Integer {
        description: Option<&'static str>,
    },
    Boolean {
        description: Option<&'static str>,
    },
    Array {
        items: Box<SchemaNode>,
        description: Option<&'static str>,
    },
    Object {
        properties: Vec<(&'static str, SchemaNode)>,
        required: Vec<&'static str>,
        description: Option<&'static str>,
    },
}

impl SchemaNode {
    pub fn string() -> Self {
        Self::String { description: None, default: None }
    }

    pub fn string_with_default(default: &'static str) -> Self {
        Self::String { description: None, default: Some(default) }
    }

    pub fn number() -> Self {
        Self::Number { description: None }
    }

    pub fn integer() -> Self {
        Self::Integer { description: None }
    }

    pub fn boolean() -> Self {
        Self::Boolean { description: None }
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::Array { items: Box::new(items), description: None }
    }

    pub fn object(properties: Vec<(&'static str, SchemaNode)>) -> Self {
        Self::Object { properties, required: Vec::new(), description: None }
    }

    /// Mark property names as required. Every name must be a property key.
    pub fn require(mut self, names: &[&'static str]) -> Self {
        match &mut self {
            Self::Object { properties, required, .. } => {
                for &name in names {
                    debug_assert!(
                        properties.iter().any(|(key, _)| *key == name),
                        "required name `{name}` is not a property"
                    );
                    required.push(name);
                }
            }
            _ => debug_assert!(false, "require() on a non-object node"),
        }
        self
    }

    /// Attach a description
    pub fn describe(mut self, text: &'static str) -> Self {
        let slot = match &mut self {
            Self::String { description, .. }
            | Self::Number { description }
            | Self::Integer { description }
            | Self::Boolean { description }
            | Self::Array { description, .. }
            | Self::Object { description, .. } => description,
        };
        *slot = Some(text);
        self
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::String { .. } => SchemaKind::String,
            Self::Number { .. } => SchemaKind::Number,
            Self::Integer { .. } => SchemaKind::Integer,
            Self::Boolean { .. } => SchemaKind::Boolean,
            Self::Array { .. } => SchemaKind::Array,
            Self::Object { .. } => SchemaKind::Object,
        }
    }
}

/// A single point of disagreement between a parsed value and a schema tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON-pointer-ish path to the offending value
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Check a parsed value against a schema tree.
///
/// Enforces required presence and kind agreement. Properties the model adds
/// beyond the schema are tolerated and ignored; non-required properties may
/// be absent.
pub fn validate(value: &Value, node: &SchemaNode) -> Result<(), SchemaViolation> {
    walk(value, node, "$")
}

fn violation(path: &str, message: impl Into<String>) -> SchemaViolation {
    SchemaViolation { path: path.to_string(), message: message.into() }
}

fn walk(value: &Value, node: &SchemaNode, path: &str) -> Result<(), SchemaViolation> {
    match node {
        SchemaNode::String { .. } => {
            if !value.is_string() {
                return Err(violation(path, "expected string"));
            }
        }
        SchemaNode::Number { .. } => {
            if !value.is_number() {
                return Err(violation(path, "expected number"));
            }
        }
        SchemaNode::Integer { .. } => {
            if !value.is_i64() && !value.is_u64() {
                return Err(violation(path, "expected integer"));
            }
        }
        SchemaNode::Boolean { .. } => {
            if !value.is_boolean() {
                return Err(violation(path, "expected boolean"));
            }
        }
        SchemaNode::Array { items, .. } => {
            let entries = value
                .as_array()
                .ok_or_else(|| violation(path, "expected array"))?;
            for (index, entry) in entries.iter().enumerate() {
                walk(entry, items, &format!("{path}[{index}]"))?;
            }
        }
        SchemaNode::Object { properties, required, .. } => {
            let map = value
                .as_object()
                .ok_or_else(|| violation(path, "expected object"))?;
            for name in required {
                if !map.contains_key(*name) {
                    return Err(violation(path, format!("missing required property `{name}`")));
                }
            }
            for (name, child) in properties {
                if let Some(entry) = map.get(*name) {
                    walk(entry, child, &format!("{path}.{name}"))?;
                }
            }
        }
    }
    Ok(())
}

// ── Advisory schema ────────────────────────────────────────────────

fn expense_breakdown() -> SchemaNode {
    SchemaNode::object(vec![
        ("seeds", SchemaNode::number()),
        ("land_preparation", SchemaNode::number()),
        ("fertilizer_and_nutrients", SchemaNode::number()),
        ("irrigation_and_water", SchemaNode::number()),
        ("labor", SchemaNode::number()),
        ("pest_and_disease_control", SchemaNode::number()),
        ("harvesting_and_transport", SchemaNode::number()),
        ("miscellaneous", SchemaNode::number()),
    ])
}

fn profitability_projection() -> SchemaNode {
    SchemaNode::object(vec![
        (
            "expected_yield",
            SchemaNode::object(vec![
                ("value_range_per_acre", SchemaNode::string()),
                ("unit", SchemaNode::string_with_default("quintals per acre")),
                ("assumptions", SchemaNode::string()),
            ]),
        ),
        (
            "farm_gate_price",
            SchemaNode::object(vec![
                ("currency", SchemaNode::string_with_default("INR")),
                ("price_per_quintal_assumed", SchemaNode::number()),
                ("assumptions", SchemaNode::string()),
            ]),
        ),
        (
            "gross_revenue_for_user_land",
            SchemaNode::object(vec![
                ("currency", SchemaNode::string_with_default("INR")),
                ("amount_range", SchemaNode::string()),
            ]),
        ),
        (
            "net_profit_for_user_land",
            SchemaNode::object(vec![
                ("currency", SchemaNode::string_with_default("INR")),
                ("amount_range", SchemaNode::string().describe(
                    "May be negative when costs exceed revenue",
                )),
            ]),
        ),
        ("roi_percentage_range", SchemaNode::string()),
    ])
}

static ADVISORY_SCHEMA: Lazy<SchemaNode> = Lazy::new(|| {
    SchemaNode::object(vec![
        ("suggested_crop_for_cultivation", SchemaNode::string().describe(
            "Properly localized common crop name, never a transliteration",
        )),
        (
            "why",
            SchemaNode::object(vec![
                ("soil_suitability", SchemaNode::string()),
                ("crop_rotation", SchemaNode::string()),
                ("market_demand", SchemaNode::string()),
            ]),
        ),
        (
            "soil_health_assessment",
            SchemaNode::object(vec![
                ("assessment", SchemaNode::string()),
                (
                    "improvement_recommendations",
                    SchemaNode::array(SchemaNode::object(vec![
                        ("recommendation", SchemaNode::string()),
                        ("benefit", SchemaNode::string()),
                        ("how_to", SchemaNode::array(SchemaNode::string()).describe(
                            "Ordered steps to apply the recommendation",
                        )),
                    ])),
                ),
            ]),
        ),
        (
            "time_to_complete_harvest",
            SchemaNode::object(vec![
                ("duration_days_range", SchemaNode::string()),
                ("season_window", SchemaNode::string()),
                ("assumptions", SchemaNode::string()),
            ]),
        ),
        (
            "estimated_total_expense_for_user_land",
            SchemaNode::object(vec![
                ("currency", SchemaNode::string_with_default("INR")),
                ("amount", SchemaNode::number()),
                ("breakdown", expense_breakdown()),
                ("unit_cost_basis", SchemaNode::string()),
                ("assumptions", SchemaNode::string()),
            ]),
        ),
        (
            "irrigation_schedule",
            SchemaNode::object(vec![
                ("frequency", SchemaNode::string()),
                ("method", SchemaNode::string()),
                ("seasonal_adjustments", SchemaNode::string()),
                ("notes", SchemaNode::string()),
            ]),
        ),
        ("profitability_projection", profitability_projection()),
        (
            "pest_and_disease_management",
            SchemaNode::array(SchemaNode::object(vec![
                ("name", SchemaNode::string()),
                ("type", SchemaNode::string()),
                ("symptoms", SchemaNode::string()),
                ("management", SchemaNode::array(SchemaNode::string())),
            ])),
        ),
        (
            "fertilizer_recommendations",
            SchemaNode::array(SchemaNode::object(vec![
                ("stage", SchemaNode::string()),
                ("fertilizer", SchemaNode::string()),
                ("dosage_per_acre", SchemaNode::string()),
                ("application_notes", SchemaNode::string()),
            ])),
        ),
        (
            "recommended_marketplaces",
            SchemaNode::array(SchemaNode::object(vec![
                ("name", SchemaNode::string()),
                ("type", SchemaNode::string()),
                ("region", SchemaNode::string()),
                ("why_suitable", SchemaNode::string()),
                ("contact_phone", SchemaNode::string()),
            ])),
        ),
        ("key_practices_for_success", SchemaNode::array(SchemaNode::string())),
        ("warnings_and_constraints", SchemaNode::array(SchemaNode::string())),
        ("data_gaps_and_assumptions", SchemaNode::array(SchemaNode::string())),
    ])
    .require(&[
        "suggested_crop_for_cultivation",
        "why",
        "soil_health_assessment",
        "time_to_complete_harvest",
        "estimated_total_expense_for_user_land",
        "irrigation_schedule",
        "profitability_projection",
        "pest_and_disease_management",
        "fertilizer_recommendations",
        "recommended_marketplaces",
        "warnings_and_constraints",
        "data_gaps_and_assumptions",
    ])
});

// ── Weather schema ─────────────────────────────────────────────────

const ICON_DESCRIPTION: &str =
    "One of exactly: Sunny, PartlyCloudy, Cloudy, Rain, Thunderstorm, Snow, Windy";

static WEATHER_SCHEMA: Lazy<SchemaNode> = Lazy::new(|| {
    SchemaNode::object(vec![
        (
            "current",
            SchemaNode::object(vec![
                ("temperature", SchemaNode::number().describe("Degrees Celsius")),
                ("condition", SchemaNode::string()),
                ("icon", SchemaNode::string().describe(ICON_DESCRIPTION)),
            ])
            .require(&["temperature", "condition", "icon"]),
        ),
        (
            "daily",
            SchemaNode::array(
                SchemaNode::object(vec![
                    ("day", SchemaNode::string()),
                    ("high_temp", SchemaNode::number()),
                    ("low_temp", SchemaNode::number()),
                    ("condition", SchemaNode::string()),
                    ("icon", SchemaNode::string().describe(ICON_DESCRIPTION)),
                ])
                .require(&["day", "high_temp", "low_temp", "condition", "icon"]),
            ),
        ),
    ])
    .require(&["current", "daily"])
});

/// The crop advisory schema tree (process-wide, immutable)
pub fn advisory_schema() -> &'static SchemaNode {
    &ADVISORY_SCHEMA
}

/// The weather forecast schema tree (process-wide, immutable)
pub fn weather_schema() -> &'static SchemaNode {
    &WEATHER_SCHEMA
}
