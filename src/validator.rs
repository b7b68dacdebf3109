//! Request validation against endpoint requirements.
//!
//! Checks declared header rules, URL-parameter rules, and (for mutating
//! methods) the request body schema, in strict declaration order. The
//! first violated rule decides the entire outcome.

use crate::config::{Endpoint, RequirementRule, SchemaNode, SchemaType};
use crate::synth::MAX_SCHEMA_DEPTH;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Validation outcome for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Fail { status: u16, body: Value },
}

impl Verdict {
    fn from_rule(rule: &RequirementRule) -> Self {
        Verdict::Fail {
            status: rule.default_status_code,
            body: rule.failure_body(),
        }
    }
}

/// Validate a request against an endpoint's declared requirements.
///
/// Checks run in strict order: header rules, then URL-parameter rules,
/// then the body schema. The first failure wins and no further checks
/// run.
pub fn validate(
    endpoint: &Endpoint,
    headers: &HashMap<String, String>,
    query: &HashMap<String, String>,
    body: Option<&[u8]>,
) -> Verdict {
    for rule in &endpoint.headers {
        if !rule.required {
            continue;
        }
        if header_value(headers, &rule.name) != Some(rule.value.as_str()) {
            return Verdict::from_rule(rule);
        }
    }

    for rule in &endpoint.url_parameters {
        if !rule.required {
            continue;
        }
        if query.get(&rule.name).map(String::as_str) != Some(rule.value.as_str()) {
            return Verdict::from_rule(rule);
        }
    }

    if endpoint.method.has_validated_body() {
        if let Some(schema) = &endpoint.request_body_schema {
            if let Err(detail) = validate_body(schema, body) {
                return Verdict::Fail {
                    status: 400,
                    body: json!({
                        "error": "request body does not match schema",
                        "detail": detail,
                    }),
                };
            }
        }
    }

    Verdict::Pass
}

/// Case-insensitive header lookup.
fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Parse the raw body as JSON and check it structurally against the
/// schema.
fn validate_body(schema: &SchemaNode, body: Option<&[u8]>) -> Result<(), String> {
    let raw = body.unwrap_or_default();
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| format!("body is not valid JSON: {}", e))?;
    validate_value(schema, &value, "$", 0)
}

/// Structural schema check: type tags, required object properties, and
/// recursive properties/items. Not full JSON Schema.
fn validate_value(schema: &SchemaNode, value: &Value, path: &str, depth: usize) -> Result<(), String> {
    if depth >= MAX_SCHEMA_DEPTH {
        // Pathologically deep schemas stop asserting rather than recurse
        return Ok(());
    }

    match schema.schema_type() {
        SchemaType::Object => {
            let object = value
                .as_object()
                .ok_or_else(|| type_mismatch(path, "object", value))?;

            if let Some(required) = &schema.required {
                for name in required {
                    if !object.contains_key(name) {
                        return Err(format!("{}: missing required property '{}'", path, name));
                    }
                }
            }

            if let Some(properties) = &schema.properties {
                for (name, node) in properties {
                    if let Some(child) = object.get(name) {
                        validate_value(node, child, &format!("{}.{}", path, name), depth + 1)?;
                    }
                }
            }
            Ok(())
        }
        SchemaType::Array => {
            let array = value
                .as_array()
                .ok_or_else(|| type_mismatch(path, "array", value))?;

            if let Some(items) = &schema.items {
                for (i, element) in array.iter().enumerate() {
                    validate_value(items, element, &format!("{}[{}]", path, i), depth + 1)?;
                }
            }
            Ok(())
        }
        SchemaType::String => value
            .is_string()
            .then_some(())
            .ok_or_else(|| type_mismatch(path, "string", value)),
        SchemaType::Number => value
            .is_number()
            .then_some(())
            .ok_or_else(|| type_mismatch(path, "number", value)),
        SchemaType::Integer => (value.is_i64() || value.is_u64())
            .then_some(())
            .ok_or_else(|| type_mismatch(path, "integer", value)),
        SchemaType::Boolean => value
            .is_boolean()
            .then_some(())
            .ok_or_else(|| type_mismatch(path, "boolean", value)),
        // Unknown types make no assertion
        SchemaType::Unknown => Ok(()),
    }
}

fn type_mismatch(path: &str, expected: &str, value: &Value) -> String {
    format!("{}: expected {}, got {}", path, expected, json_type_name(value))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
