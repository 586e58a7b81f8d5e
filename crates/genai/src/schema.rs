//! Schema conversion to the provider dialect
//!
//! A structural, depth-first, total function over the schema grammar. The
//! source grammar is a closed sum, so the match is exhaustive and there is
//! no "unsupported kind" failure path. Pure: converting the same tree twice
//! yields structurally identical output, so callers convert once per tree
//! and reuse the result.

use std::collections::BTreeMap;

use krishi_core::SchemaNode;

use crate::wire::{Schema, SchemaType};

/// Convert a provider-agnostic schema tree to the provider dialect.
///
/// `description`, `default` and `required` are preserved verbatim when
/// present and omitted entirely when absent.
pub fn convert(node: &SchemaNode) -> Schema {
    match node {
        SchemaNode::String { description, default } => Schema {
            default: default.map(|d| serde_json::Value::String(d.to_string())),
            description: description.map(str::to_string),
            ..Schema::of(SchemaType::String)
        },
        SchemaNode::Number { description } => Schema {
            description: description.map(str::to_string),
            ..Schema::of(SchemaType::Number)
        },
        SchemaNode::Integer { description } => Schema {
            description: description.map(str::to_string),
            ..Schema::of(SchemaType::Integer)
        },
        SchemaNode::Boolean { description } => Schema {
            description: description.map(str::to_string),
            ..Schema::of(SchemaType::Boolean)
        },
        SchemaNode::Array { items, description } => Schema {
            items: Some(Box::new(convert(items))),
            description: description.map(str::to_string),
            ..Schema::of(SchemaType::Array)
        },
        SchemaNode::Object { properties, required, description } => Schema {
            properties: Some(
                properties
                    .iter()
                    .map(|(name, child)| (name.to_string(), convert(child)))
                    .collect::<BTreeMap<_, _>>(),
            ),
            required: if required.is_empty() {
                None
            } else {
                Some(required.iter().map(|name| name.to_string()).collect())
            },
            description: description.map(str::to_string),
            ..Schema::of(SchemaType::Object)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krishi_core::{advisory_schema, weather_schema};

    /// Structural isomorphism: same key set and nesting per node, and every
    /// required list a subset of that node's property keys.
    fn assert_isomorphic(source: &SchemaNode, converted: &Schema) {
        match source {
            SchemaNode::Object { properties, required, .. } => {
                assert_eq!(converted.kind, SchemaType::Object);
                let converted_props = converted.properties.as_ref().expect("object keeps properties");
                assert_eq!(converted_props.len(), properties.len());
                for (name, child) in properties {
                    let converted_child = converted_props
                        .get(*name)
                        .unwrap_or_else(|| panic!("missing property `{name}`"));
                    assert_isomorphic(child, converted_child);
                }
                match &converted.required {
                    Some(names) => {
                        assert_eq!(names.len(), required.len());
                        for name in names {
                            assert!(converted_props.contains_key(name));
                        }
                    }
                    None => assert!(required.is_empty()),
                }
            }
            SchemaNode::Array { items, .. } => {
                assert_eq!(converted.kind, SchemaType::Array);
                assert_isomorphic(items, converted.items.as_ref().expect("array keeps items"));
            }
            SchemaNode::String { .. } => assert_eq!(converted.kind, SchemaType::String),
            SchemaNode::Number { .. } => assert_eq!(converted.kind, SchemaType::Number),
            SchemaNode::Integer { .. } => assert_eq!(converted.kind, SchemaType::Integer),
            SchemaNode::Boolean { .. } => assert_eq!(converted.kind, SchemaType::Boolean),
        }
    }

    #[test]
    fn advisory_conversion_is_isomorphic() {
        assert_isomorphic(advisory_schema(), &convert(advisory_schema()));
    }

    #[test]
    fn weather_conversion_is_isomorphic() {
        assert_isomorphic(weather_schema(), &convert(weather_schema()));
    }

    #[test]
    fn conversion_is_pure() {
        assert_eq!(convert(advisory_schema()), convert(advisory_schema()));
        assert_eq!(convert(weather_schema()), convert(weather_schema()));
    }

    #[test]
    fn defaults_survive_conversion() {
        let node = SchemaNode::string_with_default("INR");
        let converted = convert(&node);
        assert_eq!(converted.default, Some(serde_json::json!("INR")));
    }

    #[test]
    fn type_tags_are_uppercase_on_the_wire() {
        let json = serde_json::to_value(convert(weather_schema())).unwrap();
        assert_eq!(json["type"], "OBJECT");
        assert_eq!(json["properties"]["daily"]["type"], "ARRAY");
        assert_eq!(json["properties"]["daily"]["items"]["type"], "OBJECT");
        assert_eq!(
            json["properties"]["current"]["properties"]["temperature"]["type"],
            "NUMBER"
        );
    }

    #[test]
    fn absent_keys_are_omitted_not_null() {
        let json = serde_json::to_string(&convert(&SchemaNode::number())).unwrap();
        assert_eq!(json, r#"{"type":"NUMBER"}"#);
    }
}
