//! Inventory-backed pool handles.
//!
//! # Responsibilities
//! - Represent a configured cluster and its endpoints
//! - Build an `Upstreams` registry from `[[upstreams]]` config entries
//!
//! Owns no sockets; a real deployment plugs its own `ConnectionPool`.

use std::sync::Arc;

use crate::config::schema::UpstreamConfig;
use crate::upstream::{ConnectionPool, PoolHandle, Upstreams};

/// A named cluster with a fixed endpoint list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPool {
    cluster: String,
    endpoints: Vec<String>,
}

impl StaticPool {
    pub fn new(cluster: impl Into<String>, endpoints: Vec<String>) -> Self {
        Self {
            cluster: cluster.into(),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

impl ConnectionPool for StaticPool {
    fn cluster(&self) -> &str {
        &self.cluster
    }
}

impl Upstreams {
    /// Build a registry of [`StaticPool`] handles from the inventory.
    ///
    /// A repeated name keeps the first definition.
    pub fn from_configs(configs: &[UpstreamConfig]) -> Self {
        let mut upstreams = Upstreams::new();
        for config in configs {
            if upstreams.contains(&config.name) {
                tracing::warn!(cluster = %config.name, "Duplicate upstream definition ignored");
                continue;
            }
            if config.endpoints.is_empty() {
                tracing::warn!(cluster = %config.name, "Upstream has no endpoints");
            }
            let pool: PoolHandle =
                Arc::new(StaticPool::new(&config.name, config.endpoints.clone()));
            upstreams.insert(config.name.clone(), pool);
        }
        upstreams
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(name: &str, endpoint: &str) -> UpstreamConfig {
        UpstreamConfig {
            name: name.into(),
            endpoints: vec![endpoint.into()],
        }
    }

    #[test]
    fn from_configs_keeps_first_definition() {
        let upstreams = Upstreams::from_configs(&[
            upstream("users", "10.0.0.1:6379"),
            upstream("sessions", "10.0.0.2:6379"),
            upstream("users", "10.0.0.9:6379"),
        ]);

        assert_eq!(upstreams.len(), 2);
        assert_eq!(upstreams.get("users").unwrap().cluster(), "users");
        assert_eq!(upstreams.cluster_names(), vec!["sessions", "users"]);
    }
}
