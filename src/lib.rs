//! Chaos Mock Engine
//!
//! The serving engine behind a chaos mock-API product: operators
//! register groups of endpoints describing how a fake HTTP API answers
//! a given method and path, and the engine resolves, validates, delays,
//! and answers each request.
//!
//! # Features
//!
//! - **Endpoint Matching**: Exact (group, method, path) resolution
//! - **Requirement Rules**: Required headers and URL parameters with
//!   per-rule fallback status and body
//! - **Schema Synthesis**: Response bodies generated from JSON-Schema-like
//!   trees with `$provider` fake-data annotations
//! - **Chaos Delays**: Fixed or randomized latency bounded by
//!   `max_wait_ms`
//! - **Always Answers**: Misconfiguration degrades; it never turns into
//!   a hard failure visible to the API consumer
//!
//! # Example Configuration
//!
//! ```yaml
//! groups:
//!   - name: shop
//!     endpoints:
//!       - id: list-users
//!         method: GET
//!         path: users
//!         max_wait_ms: 200
//!         chaos_mode: true
//!         response:
//!           type: dynamic
//!           schema:
//!             type: object
//!             properties:
//!               id:
//!                 type: integer
//!               name:
//!                 type: string
//!                 $provider: faker.name
//!             required: [id, name]
//! ```

pub mod chaos;
pub mod config;
pub mod engine;
pub mod matcher;
pub mod provider;
pub mod synth;
pub mod validator;

pub use config::{EngineConfig, Endpoint, HttpMethod, ResponseKind};
pub use engine::{EngineResponse, MockEngine};
pub use matcher::{ConfigProvider, InMemoryProvider};
pub use provider::ProviderRegistry;
