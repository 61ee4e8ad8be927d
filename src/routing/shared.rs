//! Hot-swappable router snapshot.
//!
//! # Responsibilities
//! - Publish the active `PrefixRouter` to concurrent readers
//! - Build a replacement off to the side and swap it in atomically
//! - Keep the previous router when a reload fails validation
//!
//! # Design Decisions
//! - `ArcSwap` gives lock-free reads; readers hold an `Arc` snapshot for
//!   as long as they need it, even across a swap
//! - Reload is the only writer

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::PrefixRoutesConfig;
use crate::observability::metrics;
use crate::routing::router::PrefixRouter;
use crate::routing::table::RouteTableError;
use crate::upstream::Upstreams;

/// The router currently in effect.
#[derive(Debug)]
pub struct SharedRouter {
    current: ArcSwap<PrefixRouter>,
}

impl SharedRouter {
    pub fn new(router: PrefixRouter) -> Self {
        metrics::set_route_count(router.table().len());
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Snapshot of the active router.
    pub fn load(&self) -> Arc<PrefixRouter> {
        self.current.load_full()
    }

    /// Publish an already-built router.
    pub fn store(&self, router: PrefixRouter) {
        metrics::set_route_count(router.table().len());
        self.current.store(Arc::new(router));
    }

    /// Rebuild from new route configuration and upstream registry.
    ///
    /// On error the active router is left in place.
    pub fn reload(
        &self,
        config: &PrefixRoutesConfig,
        upstreams: Arc<Upstreams>,
    ) -> Result<(), RouteTableError> {
        match PrefixRouter::from_config(config, upstreams) {
            Ok(router) => {
                tracing::info!(
                    routes = router.table().len(),
                    upstreams = router.upstreams().len(),
                    "Route table reloaded"
                );
                self.store(router);
                metrics::record_reload(true);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Route table reload rejected, keeping current routes");
                metrics::record_reload(false);
                Err(e)
            }
        }
    }

    /// Rebuild the route table, keeping the current upstream registry.
    pub fn reload_routes(&self, config: &PrefixRoutesConfig) -> Result<(), RouteTableError> {
        let upstreams = Arc::clone(self.current.load().upstreams());
        self.reload(config, upstreams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PrefixRouteConfig;
    use crate::upstream::{PoolHandle, StaticPool};

    fn upstreams() -> Arc<Upstreams> {
        let mut upstreams = Upstreams::new();
        for name in ["a", "b"] {
            let pool: PoolHandle = Arc::new(StaticPool::new(name, Vec::new()));
            upstreams.insert(name, pool);
        }
        Arc::new(upstreams)
    }

    fn routes(prefixes: &[(&str, &str)]) -> PrefixRoutesConfig {
        PrefixRoutesConfig {
            routes: prefixes
                .iter()
                .map(|(p, c)| PrefixRouteConfig::new(*p, *c))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn reload_swaps_router() {
        let shared = SharedRouter::new(
            PrefixRouter::from_config(&routes(&[("k", "a")]), upstreams()).unwrap(),
        );
        let before = shared.load();

        shared.reload_routes(&routes(&[("k", "b")])).unwrap();

        assert_eq!(shared.load().route("k:1").pool().unwrap().cluster(), "b");
        // Old snapshot keeps answering with the old table.
        assert_eq!(before.route("k:1").pool().unwrap().cluster(), "a");
    }

    #[test]
    fn failed_reload_keeps_current_router() {
        let shared = SharedRouter::new(
            PrefixRouter::from_config(&routes(&[("k", "a")]), upstreams()).unwrap(),
        );

        let err = shared
            .reload_routes(&routes(&[("x", "b"), ("x", "a")]))
            .unwrap_err();
        assert_eq!(err, RouteTableError::DuplicatePrefix { prefix: "x".into() });

        let current = shared.load();
        assert_eq!(current.route("k:1").pool().unwrap().cluster(), "a");
        assert!(current.route("x:1").is_no_route());
    }
}
