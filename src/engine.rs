//! Request pipeline.
//!
//! One execution per inbound request:
//! match -> validate -> (fail | delay -> synthesize -> respond).
//! Every failure path resolves locally into a complete response; nothing
//! propagates to the caller as an error, and a misconfigured endpoint
//! never affects the rest of the configuration.

use crate::chaos;
use crate::config::{EngineConfig, EngineSettings, HttpMethod, ResponseKind};
use crate::matcher::{ConfigProvider, InMemoryProvider};
use crate::provider::ProviderRegistry;
use crate::synth::{SchemaSynthesizer, SynthDiagnostics};
use crate::validator::{self, Verdict};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

const CONTENT_TYPE_JSON: &str = "application/json";

/// A complete HTTP-shaped response produced by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl EngineResponse {
    fn json(status: u16, value: &Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string());
        Self {
            status,
            headers,
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    fn literal(status: u16, content_type: &str, body: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        Self {
            status,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    /// The body as UTF-8 text, lossy.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Request counters, readable while the engine serves.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    requests_total: AtomicU64,
    requests_matched: AtomicU64,
    requests_unmatched: AtomicU64,
    validation_failures: AtomicU64,
    unknown_providers: AtomicU64,
    depth_limited_schemas: AtomicU64,
}

impl EngineMetrics {
    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn requests_matched(&self) -> u64 {
        self.requests_matched.load(Ordering::Relaxed)
    }

    pub fn requests_unmatched(&self) -> u64 {
        self.requests_unmatched.load(Ordering::Relaxed)
    }

    pub fn validation_failures(&self) -> u64 {
        self.validation_failures.load(Ordering::Relaxed)
    }

    pub fn unknown_providers(&self) -> u64 {
        self.unknown_providers.load(Ordering::Relaxed)
    }

    pub fn depth_limited_schemas(&self) -> u64 {
        self.depth_limited_schemas.load(Ordering::Relaxed)
    }
}

/// The serving engine: resolves, validates, delays, and answers
/// requests against a configuration snapshot.
pub struct MockEngine<P> {
    provider: P,
    synthesizer: SchemaSynthesizer,
    settings: EngineSettings,
    metrics: EngineMetrics,
}

impl MockEngine<InMemoryProvider> {
    /// Build an engine over an in-memory snapshot of the given
    /// configuration, with the builtin faker providers.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            InMemoryProvider::from_config(config),
            Arc::new(ProviderRegistry::with_builtin_fakers()),
            config.settings.clone(),
        )
    }
}

impl<P: ConfigProvider> MockEngine<P> {
    /// Create an engine from its collaborators.
    pub fn new(provider: P, registry: Arc<ProviderRegistry>, settings: EngineSettings) -> Self {
        Self {
            provider,
            synthesizer: SchemaSynthesizer::new(registry),
            settings,
            metrics: EngineMetrics::default(),
        }
    }

    /// Request counters.
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// The configuration provider backing this engine.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Serve one request. This is the engine's single public entry
    /// point; the embedding HTTP layer owns the socket and hands over
    /// the already-parsed request parts. Dropping the returned future
    /// (e.g. when the caller's connection closes mid-delay) abandons
    /// the request without side effects.
    pub async fn handle(
        &self,
        group: &str,
        method: HttpMethod,
        path: &str,
        headers: &HashMap<String, String>,
        query: &HashMap<String, String>,
        body: Option<&[u8]>,
    ) -> EngineResponse {
        self.metrics.requests_total.fetch_add(1, Ordering::Relaxed);

        let Some(endpoint) = self.provider.find_endpoint(group, method, path).await else {
            self.metrics
                .requests_unmatched
                .fetch_add(1, Ordering::Relaxed);
            if self.settings.log_unmatched {
                warn!(group = %group, method = %method, path = %path, "No matching endpoint");
            }
            return Self::not_found();
        };

        self.metrics.requests_matched.fetch_add(1, Ordering::Relaxed);
        if self.settings.log_matches {
            info!(
                endpoint_id = %endpoint.id,
                method = %method,
                path = %path,
                "Request matched endpoint"
            );
        }

        // Validation failures short-circuit: no delay, no synthesis
        if let Verdict::Fail { status, body } =
            validator::validate(&endpoint, headers, query, body)
        {
            self.metrics
                .validation_failures
                .fetch_add(1, Ordering::Relaxed);
            debug!(endpoint_id = %endpoint.id, status, "Request failed validation");
            return EngineResponse::json(status, &body);
        }

        chaos::apply_delay(endpoint.max_wait_ms, endpoint.chaos_mode).await;

        match &endpoint.response {
            ResponseKind::Fixed { body } => EngineResponse::literal(
                endpoint.response_status_code,
                &self.settings.fixed_content_type,
                body,
            ),
            ResponseKind::Dynamic { schema } => {
                let (value, diagnostics) = self.synthesizer.synthesize(schema);
                self.record_synth_diagnostics(&endpoint.id, &diagnostics);
                EngineResponse::json(endpoint.response_status_code, &value)
            }
        }
    }

    fn record_synth_diagnostics(&self, endpoint_id: &str, diagnostics: &SynthDiagnostics) {
        if !diagnostics.unknown_providers.is_empty() {
            self.metrics.unknown_providers.fetch_add(
                diagnostics.unknown_providers.len() as u64,
                Ordering::Relaxed,
            );
            warn!(
                endpoint_id = %endpoint_id,
                providers = ?diagnostics.unknown_providers,
                "Endpoint schema references unregistered providers"
            );
        }
        if diagnostics.depth_exceeded {
            self.metrics
                .depth_limited_schemas
                .fetch_add(1, Ordering::Relaxed);
            warn!(endpoint_id = %endpoint_id, "Endpoint schema exceeded the depth ceiling");
        }
    }

    fn not_found() -> EngineResponse {
        EngineResponse::json(
            404,
            &json!({
                "error": "not_found",
                "message": "No endpoint matches the group, method, and path",
            }),
        )
    }
}
