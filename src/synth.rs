//! Response body synthesis from JSON-Schema-like trees.
//!
//! Walks a schema depth-first and produces a concrete JSON value,
//! consulting the provider registry for `$provider`-annotated leaves.
//! Synthesis never fails: misconfigured schemas degrade to type defaults
//! and the degradation is reported through [`SynthDiagnostics`].

use crate::config::{SchemaNode, SchemaType};
use crate::provider::ProviderRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Recursion ceiling for schema walks. The source format does not
/// prevent self-referential schemas, so depth is bounded explicitly.
pub const MAX_SCHEMA_DEPTH: usize = 32;

/// What went wrong (non-fatally) during one synthesis pass. Reported to
/// the caller's diagnostics, never surfaced in the response body.
#[derive(Debug, Clone, Default)]
pub struct SynthDiagnostics {
    /// Provider names that were referenced but not registered
    pub unknown_providers: Vec<String>,
    /// Whether any subtree was cut off at the depth ceiling
    pub depth_exceeded: bool,
}

impl SynthDiagnostics {
    /// True when the pass completed without degradation.
    pub fn is_clean(&self) -> bool {
        self.unknown_providers.is_empty() && !self.depth_exceeded
    }
}

/// Synthesizes JSON values from schema trees.
pub struct SchemaSynthesizer {
    registry: Arc<ProviderRegistry>,
}

impl SchemaSynthesizer {
    /// Create a synthesizer backed by the given provider registry.
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Produce a concrete JSON value for the schema, along with the
    /// diagnostics gathered on the way.
    pub fn synthesize(&self, schema: &SchemaNode) -> (Value, SynthDiagnostics) {
        let mut diagnostics = SynthDiagnostics::default();
        let value = self.synthesize_node(schema, 0, &mut diagnostics);
        (value, diagnostics)
    }

    fn synthesize_node(
        &self,
        schema: &SchemaNode,
        depth: usize,
        diagnostics: &mut SynthDiagnostics,
    ) -> Value {
        if depth >= MAX_SCHEMA_DEPTH {
            diagnostics.depth_exceeded = true;
            return json!({});
        }

        match schema.schema_type() {
            SchemaType::Object => {
                let mut object = serde_json::Map::new();
                if let Some(properties) = &schema.properties {
                    // Full synthesis: every declared property is produced,
                    // required or not
                    for (name, node) in properties {
                        object.insert(
                            name.clone(),
                            self.synthesize_node(node, depth + 1, diagnostics),
                        );
                    }
                }
                Value::Object(object)
            }
            SchemaType::Array => match &schema.items {
                Some(items) => {
                    Value::Array(vec![self.synthesize_node(items, depth + 1, diagnostics)])
                }
                None => Value::Array(vec![]),
            },
            SchemaType::String => {
                self.synthesize_leaf(schema, diagnostics, || json!("string"))
            }
            SchemaType::Number | SchemaType::Integer => {
                self.synthesize_leaf(schema, diagnostics, || json!(0))
            }
            SchemaType::Boolean => {
                self.synthesize_leaf(schema, diagnostics, || json!(false))
            }
            SchemaType::Unknown => json!({}),
        }
    }

    /// Leaf resolution order: provider, then example, then type default.
    fn synthesize_leaf<F>(
        &self,
        schema: &SchemaNode,
        diagnostics: &mut SynthDiagnostics,
        type_default: F,
    ) -> Value
    where
        F: FnOnce() -> Value,
    {
        if let Some(name) = &schema.provider {
            match self.registry.generate(name) {
                Ok(value) => return value,
                Err(_) => {
                    warn!(provider = %name, "Schema references unregistered provider");
                    diagnostics.unknown_providers.push(name.clone());
                }
            }
        }
        schema
            .example
            .clone()
            .unwrap_or_else(type_default)
    }
}
