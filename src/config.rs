//! Configuration for the chaos mock engine.
//!
//! Defines endpoint groups, requirement rules, response recipes, and
//! engine settings. The records here are produced by an external
//! configuration provider and are read-only inputs to the serving path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Top-level engine configuration: endpoint groups plus global settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Endpoint groups in declaration order
    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    /// Global settings
    #[serde(default)]
    pub settings: EngineSettings,
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (i, group) in self.groups.iter().enumerate() {
            group
                .validate()
                .map_err(|e| anyhow::anyhow!("Group {}: {}", i, e))?;
        }
        Ok(())
    }

    /// Total number of endpoints across all groups.
    pub fn endpoint_count(&self) -> usize {
        self.groups.iter().map(|g| g.endpoints.len()).sum()
    }
}

/// A named group of endpoints. The group name is the first segment of
/// the externally matched route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    /// Group name (route prefix)
    pub name: String,

    /// Endpoints in declaration order
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl GroupConfig {
    /// Validate the group and its endpoints.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            anyhow::bail!("Group name cannot be empty");
        }
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            endpoint
                .validate()
                .map_err(|e| anyhow::anyhow!("endpoint {}: {}", i, e))?;
        }
        Ok(())
    }
}

/// HTTP methods the engine matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Whether this method carries a request body the engine validates.
    pub fn has_validated_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => anyhow::bail!("Unsupported HTTP method: {}", other),
        }
    }
}

/// A single mock endpoint definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoint {
    /// Unique identifier for this endpoint
    pub id: String,

    /// HTTP method to match
    pub method: HttpMethod,

    /// Path to match, relative to the group name (no leading slash)
    pub path: String,

    /// Whether this endpoint is served
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound on the artificial response delay, in milliseconds
    #[serde(default)]
    pub max_wait_ms: u64,

    /// When true the delay is randomized in [0, max_wait_ms];
    /// when false it is exactly max_wait_ms
    #[serde(default)]
    pub chaos_mode: bool,

    /// Status code emitted on the success path
    #[serde(default = "default_status")]
    pub response_status_code: u16,

    /// Response recipe
    pub response: ResponseKind,

    /// Schema the request body must satisfy on POST/PUT/PATCH
    #[serde(default)]
    pub request_body_schema: Option<SchemaNode>,

    /// Header rules in validation-precedence order
    #[serde(default)]
    pub headers: Vec<RequirementRule>,

    /// URL parameter rules in validation-precedence order
    #[serde(default)]
    pub url_parameters: Vec<RequirementRule>,
}

fn default_true() -> bool {
    true
}

fn default_status() -> u16 {
    200
}

impl Endpoint {
    /// Validate the endpoint definition.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.is_empty() {
            anyhow::bail!("Endpoint id cannot be empty");
        }
        if !(100..=599).contains(&self.response_status_code) {
            anyhow::bail!("Invalid status code: {}", self.response_status_code);
        }
        for rule in self.headers.iter().chain(self.url_parameters.iter()) {
            rule.validate()
                .map_err(|e| anyhow::anyhow!("rule '{}': {}", rule.name, e))?;
        }
        Ok(())
    }
}

/// Response recipe: exactly one of a literal body or a synthesis schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseKind {
    /// Literal body returned verbatim
    Fixed {
        #[serde(default)]
        body: String,
    },
    /// Body synthesized from a JSON schema per request
    Dynamic { schema: SchemaNode },
}

/// A required/optional constraint on a header or URL parameter, with the
/// fallback status and body returned when a required rule fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementRule {
    /// Header or parameter name (headers match case-insensitively)
    pub name: String,

    /// Expected value (must-equal semantics)
    pub value: String,

    /// If false, the rule makes no assertion
    #[serde(default)]
    pub required: bool,

    /// Status code returned when a required rule fails
    #[serde(default = "default_rule_status")]
    pub default_status_code: u16,

    /// Body returned when a required rule fails; absent means `{}`
    #[serde(default)]
    pub default_response: Option<serde_json::Value>,
}

fn default_rule_status() -> u16 {
    400
}

impl RequirementRule {
    /// Validate the rule definition.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            anyhow::bail!("rule name cannot be empty");
        }
        if !(100..=599).contains(&self.default_status_code) {
            anyhow::bail!("invalid default status code: {}", self.default_status_code);
        }
        Ok(())
    }

    /// The fallback body for a failed rule.
    pub fn failure_body(&self) -> serde_json::Value {
        self.default_response
            .clone()
            .unwrap_or_else(|| serde_json::json!({}))
    }
}

/// A JSON-Schema-like node. Tolerant by design: unknown `type` strings
/// from the configuration console are accepted, never an error on the
/// serving path.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchemaNode {
    /// Schema type: object, array, string, number, integer, boolean.
    /// Anything else is treated as unknown.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Object properties (name -> schema)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaNode>>,

    /// Required property names for objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    /// Element schema for arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,

    /// Data provider annotation for leaf values (e.g. `faker.email`)
    #[serde(rename = "$provider", default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Literal fallback value for leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

impl SchemaNode {
    /// The schema type, classified.
    pub fn schema_type(&self) -> SchemaType {
        match self.kind.as_deref() {
            Some("object") => SchemaType::Object,
            Some("array") => SchemaType::Array,
            Some("string") => SchemaType::String,
            Some("number") => SchemaType::Number,
            Some("integer") => SchemaType::Integer,
            Some("boolean") => SchemaType::Boolean,
            _ => SchemaType::Unknown,
        }
    }
}

/// Classified schema node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Unknown,
}

/// Global engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// Log matched requests
    #[serde(default = "default_true")]
    pub log_matches: bool,

    /// Log unmatched requests
    #[serde(default = "default_true")]
    pub log_unmatched: bool,

    /// Content type for fixed literal bodies
    #[serde(default = "default_fixed_content_type")]
    pub fixed_content_type: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_matches: true,
            log_unmatched: true,
            fixed_content_type: default_fixed_content_type(),
        }
    }
}

fn default_fixed_content_type() -> String {
    "text/plain".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_endpoint() {
        let yaml = r#"
groups:
  - name: demo
    endpoints:
      - id: hello
        method: GET
        path: hello
        response:
          type: fixed
          body: "Hello, World!"
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].endpoints[0].id, "hello");
        assert_eq!(config.groups[0].endpoints[0].response_status_code, 200);
        assert!(config.groups[0].endpoints[0].enabled);

        match &config.groups[0].endpoints[0].response {
            ResponseKind::Fixed { body } => assert_eq!(body, "Hello, World!"),
            _ => panic!("Expected fixed response"),
        }
    }

    #[test]
    fn test_parse_dynamic_endpoint() {
        let yaml = r#"
groups:
  - name: demo
    endpoints:
      - id: user
        method: GET
        path: user
        response_status_code: 200
        response:
          type: dynamic
          schema:
            type: object
            properties:
              id:
                type: integer
              name:
                type: string
                $provider: faker.name
            required: [id, name]
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        let endpoint = &config.groups[0].endpoints[0];

        match &endpoint.response {
            ResponseKind::Dynamic { schema } => {
                assert_eq!(schema.schema_type(), SchemaType::Object);
                let props = schema.properties.as_ref().unwrap();
                assert_eq!(props["name"].provider.as_deref(), Some("faker.name"));
            }
            _ => panic!("Expected dynamic response"),
        }
    }

    #[test]
    fn test_parse_requirement_rules() {
        let yaml = r#"
groups:
  - name: demo
    endpoints:
      - id: secured
        method: GET
        path: secured
        response:
          type: fixed
          body: ok
        headers:
          - name: X-Key
            value: secret
            required: true
            default_status_code: 401
            default_response:
              error: missing key
        url_parameters:
          - name: version
            value: "2"
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        let endpoint = &config.groups[0].endpoints[0];

        let header = &endpoint.headers[0];
        assert!(header.required);
        assert_eq!(header.default_status_code, 401);
        assert_eq!(header.failure_body()["error"], "missing key");

        let param = &endpoint.url_parameters[0];
        assert!(!param.required);
        assert_eq!(param.default_status_code, 400);
        assert_eq!(param.failure_body(), serde_json::json!({}));
    }

    #[test]
    fn test_parse_chaos_settings() {
        let yaml = r#"
groups:
  - name: demo
    endpoints:
      - id: slow
        method: GET
        path: slow
        max_wait_ms: 1500
        chaos_mode: true
        response:
          type: fixed
          body: ok
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        let endpoint = &config.groups[0].endpoints[0];
        assert_eq!(endpoint.max_wait_ms, 1500);
        assert!(endpoint.chaos_mode);
    }

    #[test]
    fn test_validate_rejects_bad_status_code() {
        let yaml = r#"
groups:
  - name: demo
    endpoints:
      - id: broken
        method: GET
        path: broken
        response_status_code: 99
        response:
          type: fixed
          body: ok
"#;
        assert!(EngineConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_group_name() {
        let yaml = r#"
groups:
  - name: ""
    endpoints: []
"#;
        assert!(EngineConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_schema_node_tolerates_unknown_type() {
        let json = r#"{"type": "null"}"#;
        let node: SchemaNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.schema_type(), SchemaType::Unknown);

        let node: SchemaNode = serde_json::from_str("{}").unwrap();
        assert_eq!(node.schema_type(), SchemaType::Unknown);
    }

    #[test]
    fn test_method_round_trip() {
        for (text, method) in [
            ("GET", HttpMethod::Get),
            ("POST", HttpMethod::Post),
            ("PUT", HttpMethod::Put),
            ("PATCH", HttpMethod::Patch),
            ("DELETE", HttpMethod::Delete),
        ] {
            assert_eq!(text.parse::<HttpMethod>().unwrap(), method);
            assert_eq!(method.to_string(), text);
        }
        assert!("TRACE".parse::<HttpMethod>().is_err());
        assert!(HttpMethod::Post.has_validated_body());
        assert!(!HttpMethod::Get.has_validated_body());
    }

    #[test]
    fn test_endpoint_count() {
        let yaml = r#"
groups:
  - name: a
    endpoints:
      - id: one
        method: GET
        path: one
        response: { type: fixed, body: "1" }
  - name: b
    endpoints:
      - id: two
        method: GET
        path: two
        response: { type: fixed, body: "2" }
      - id: three
        method: GET
        path: three
        response: { type: fixed, body: "3" }
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.endpoint_count(), 3);
    }
}
