//! Shared utilities for integration tests.

use std::sync::Arc;

use kv_prefix_router::config::{CatchAllRouteConfig, PrefixRouteConfig, PrefixRoutesConfig};
use kv_prefix_router::{ConnectionPool, PoolHandle, Upstreams};

/// Pool stand-in that only knows its cluster name.
#[derive(Debug)]
pub struct MockPool {
    cluster: String,
}

impl ConnectionPool for MockPool {
    fn cluster(&self) -> &str {
        &self.cluster
    }
}

/// Create a fresh mock pool handle.
pub fn pool(cluster: &str) -> PoolHandle {
    Arc::new(MockPool {
        cluster: cluster.to_string(),
    })
}

/// Build a registry from `(cluster, handle)` pairs.
pub fn upstreams(pools: &[(&str, &PoolHandle)]) -> Arc<Upstreams> {
    let mut upstreams = Upstreams::new();
    for (cluster, handle) in pools {
        upstreams.insert(*cluster, Arc::clone(handle));
    }
    Arc::new(upstreams)
}

/// Rules `ab → fake_clusterA`, `a → fake_clusterB`.
#[allow(dead_code)]
pub fn prefix_routes() -> PrefixRoutesConfig {
    PrefixRoutesConfig {
        routes: vec![
            PrefixRouteConfig::new("ab", "fake_clusterA"),
            PrefixRouteConfig::new("a", "fake_clusterB"),
        ],
        case_insensitive: false,
        catch_all_route: None,
    }
}

#[allow(dead_code)]
pub fn with_catch_all(mut routes: PrefixRoutesConfig, cluster: &str) -> PrefixRoutesConfig {
    routes.catch_all_route = Some(CatchAllRouteConfig::new(cluster));
    routes
}

/// Every prefix in `prefixes` routed to `cluster`.
#[allow(dead_code)]
pub fn prefix_routes_to(prefixes: &[&str], cluster: &str) -> PrefixRoutesConfig {
    PrefixRoutesConfig {
        routes: prefixes
            .iter()
            .map(|p| PrefixRouteConfig::new(*p, cluster))
            .collect(),
        case_insensitive: false,
        catch_all_route: None,
    }
}
