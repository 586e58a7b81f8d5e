//! Defensive post-processing of structured model output
//!
//! The schema constraint asks for bare JSON, but models still occasionally
//! wrap the payload in markdown fences or stray whitespace. Strip that,
//! then parse and check against the schema tree. No partial recovery: a
//! response either validates or is rejected whole.

use krishi_core::{validate, SchemaNode};
use krishi_genai::GenAiError;

/// Remove a surrounding markdown code fence (with optional info string)
/// and leading/trailing whitespace.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string line ("json", "JSON", or nothing)
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let body = &rest[newline + 1..];
    let body = body.trim_end().strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// Parse raw model text into a schema-validated JSON value.
///
/// Empty text (after fence stripping) is `EmptyModelResponse`; parse and
/// validation failures are `MalformedModelOutput`.
pub fn parse_structured(
    raw: &str,
    schema: &SchemaNode,
) -> Result<serde_json::Value, GenAiError> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(GenAiError::EmptyModelResponse);
    }
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| GenAiError::MalformedModelOutput(e.to_string()))?;
    validate(&value, schema).map_err(|v| GenAiError::MalformedModelOutput(v.to_string()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use krishi_core::weather_schema;

    #[test]
    fn strips_json_fence_with_whitespace() {
        let wrapped = "\n  ```json\n{\"a\": 1}\n```  \n";
        assert_eq!(strip_code_fences(wrapped), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn fenced_payload_parses() {
        let raw = "```json\n{\"current\": {\"temperature\": 30.0, \"condition\": \"Clear\", \"icon\": \"Sunny\"}, \"daily\": []}\n```";
        assert!(parse_structured(raw, weather_schema()).is_ok());
    }

    #[test]
    fn empty_text_never_reaches_the_parser() {
        for raw in ["", "   ", "\n\t"] {
            let err = parse_structured(raw, weather_schema()).unwrap_err();
            assert!(matches!(err, GenAiError::EmptyModelResponse), "raw {raw:?}");
        }
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_structured("{not json", weather_schema()).unwrap_err();
        assert!(matches!(err, GenAiError::MalformedModelOutput(_)));
    }

    #[test]
    fn schema_violation_is_malformed() {
        let err = parse_structured("{\"daily\": []}", weather_schema()).unwrap_err();
        assert!(matches!(err, GenAiError::MalformedModelOutput(_)));
    }
}
