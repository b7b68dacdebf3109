//! Endpoint resolution.
//!
//! Resolves an inbound (group, method, path) triple to a single endpoint
//! configuration. Matching is exact: no patterns, no prefix matching,
//! one canonicalization pass that strips a single leading and trailing
//! slash from each side of the comparison.

use crate::config::{Endpoint, EngineConfig, GroupConfig, HttpMethod};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-only source of endpoint configuration. Implemented by the
/// external configuration provider; the engine only ever calls
/// `find_endpoint`.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Resolve a request to its endpoint, or `None` when nothing
    /// matches.
    async fn find_endpoint(
        &self,
        group: &str,
        method: HttpMethod,
        path: &str,
    ) -> Option<Arc<Endpoint>>;
}

/// Strip one leading and one trailing slash.
fn canonical(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Whether an endpoint serves the given method and canonicalized path.
fn endpoint_matches(endpoint: &Endpoint, method: HttpMethod, path: &str) -> bool {
    endpoint.enabled && endpoint.method == method && canonical(&endpoint.path) == path
}

struct GroupSnapshot {
    name: String,
    endpoints: Vec<Arc<Endpoint>>,
}

/// In-memory [`ConfigProvider`] holding an atomically replaceable
/// configuration snapshot. Lookups clone the snapshot handle and never
/// hold the lock across awaits, so the configuration provider can swap
/// in a new snapshot at any time without stalling requests.
pub struct InMemoryProvider {
    snapshot: RwLock<Arc<Vec<GroupSnapshot>>>,
}

impl InMemoryProvider {
    /// Create a provider from endpoint groups.
    pub fn new(groups: Vec<GroupConfig>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Self::build_snapshot(groups))),
        }
    }

    /// Create a provider from a loaded configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.groups.clone())
    }

    /// Replace the whole configuration snapshot. In-flight lookups keep
    /// reading the snapshot they already resolved.
    pub async fn replace(&self, groups: Vec<GroupConfig>) {
        let snapshot = Arc::new(Self::build_snapshot(groups));
        *self.snapshot.write().await = snapshot;
    }

    fn build_snapshot(groups: Vec<GroupConfig>) -> Vec<GroupSnapshot> {
        groups
            .into_iter()
            .map(|group| GroupSnapshot {
                name: group.name,
                endpoints: group.endpoints.into_iter().map(Arc::new).collect(),
            })
            .collect()
    }
}

#[async_trait]
impl ConfigProvider for InMemoryProvider {
    async fn find_endpoint(
        &self,
        group: &str,
        method: HttpMethod,
        path: &str,
    ) -> Option<Arc<Endpoint>> {
        let snapshot = Arc::clone(&*self.snapshot.read().await);
        let path = canonical(path);

        // Declaration order resolves duplicate registrations: the first
        // matching endpoint wins
        snapshot
            .iter()
            .filter(|g| g.name == group)
            .flat_map(|g| g.endpoints.iter())
            .find(|endpoint| endpoint_matches(endpoint, method, path))
            .map(Arc::clone)
    }
}
