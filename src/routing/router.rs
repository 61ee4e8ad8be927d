//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Find the longest configured prefix of a key
//! - Strip the matched prefix when the rule asks for it
//! - Resolve the route's cluster through the upstream registry
//! - Return a pool handle or an explicit "no route"
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - The forwarded key is returned as a sub-slice of the caller's key,
//!   never written back through shared state
//! - A cluster missing from the registry is reported exactly like an
//!   unmatched key
//! - Lookup never blocks, performs no I/O and does not allocate

use std::sync::Arc;
use thiserror::Error;

use crate::config::schema::PrefixRoutesConfig;
use crate::observability::metrics;
use crate::routing::route::Route;
use crate::routing::table::{RouteTable, RouteTableError};
use crate::upstream::{PoolHandle, Upstreams};

/// A resolved route: the pool to use and the rule that selected it.
#[derive(Debug, Clone)]
pub struct Target {
    pub pool: PoolHandle,
    pub route: Arc<Route>,
}

/// Result of routing one key.
#[derive(Debug, Clone)]
pub enum RouteOutcome<'k> {
    /// A prefix rule matched. `key` is the key to forward, shortened when
    /// the rule strips its prefix.
    Matched { target: Target, key: &'k str },
    /// No rule matched; the catch-all cluster takes the unchanged key.
    CatchAll { target: Target, key: &'k str },
    /// Nothing matched, or the selected cluster has no upstream.
    NoRoute,
}

impl<'k> RouteOutcome<'k> {
    pub fn target(&self) -> Option<&Target> {
        match self {
            RouteOutcome::Matched { target, .. } | RouteOutcome::CatchAll { target, .. } => {
                Some(target)
            }
            RouteOutcome::NoRoute => None,
        }
    }

    pub fn pool(&self) -> Option<&PoolHandle> {
        self.target().map(|t| &t.pool)
    }

    /// Key to forward, if routed.
    pub fn key(&self) -> Option<&'k str> {
        match self {
            RouteOutcome::Matched { key, .. } | RouteOutcome::CatchAll { key, .. } => Some(*key),
            RouteOutcome::NoRoute => None,
        }
    }

    pub fn into_target(self) -> Option<Target> {
        match self {
            RouteOutcome::Matched { target, .. } | RouteOutcome::CatchAll { target, .. } => {
                Some(target)
            }
            RouteOutcome::NoRoute => None,
        }
    }

    pub fn is_no_route(&self) -> bool {
        matches!(self, RouteOutcome::NoRoute)
    }

    /// Static label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteOutcome::Matched { .. } => "matched",
            RouteOutcome::CatchAll { .. } => "catch_all",
            RouteOutcome::NoRoute => "no_route",
        }
    }
}

/// No upstream could take the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no upstream host")]
pub struct NoUpstream;

/// Everything a protocol filter needs to forward one command.
#[derive(Debug, Clone)]
pub struct Dispatch<'k> {
    pub primary: PoolHandle,
    pub mirrors: Vec<PoolHandle>,
    pub key: &'k str,
    pub route: Arc<Route>,
}

/// Longest-prefix router over a route table and an upstream registry.
#[derive(Debug, Clone)]
pub struct PrefixRouter {
    table: Arc<RouteTable>,
    upstreams: Arc<Upstreams>,
}

impl PrefixRouter {
    pub fn new(table: RouteTable, upstreams: Arc<Upstreams>) -> Self {
        Self {
            table: Arc::new(table),
            upstreams,
        }
    }

    /// Build the route table from configuration and bind it to `upstreams`.
    pub fn from_config(
        config: &PrefixRoutesConfig,
        upstreams: Arc<Upstreams>,
    ) -> Result<Self, RouteTableError> {
        Ok(Self::new(RouteTable::new(config)?, upstreams))
    }

    /// Same table, different upstream registry.
    pub fn with_upstreams(&self, upstreams: Arc<Upstreams>) -> Self {
        Self {
            table: Arc::clone(&self.table),
            upstreams,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn upstreams(&self) -> &Arc<Upstreams> {
        &self.upstreams
    }

    /// Route `key`.
    pub fn route<'k>(&self, key: &'k str) -> RouteOutcome<'k> {
        let outcome = self.resolve(key);
        metrics::record_route(outcome.kind());
        outcome
    }

    fn resolve<'k>(&self, key: &'k str) -> RouteOutcome<'k> {
        if let Some(found) = self.table.longest_match(key) {
            let route = found.route;
            let Some(pool) = self.upstreams.get(route.cluster()) else {
                tracing::debug!(cluster = %route.cluster(), "Matched cluster has no upstream");
                return RouteOutcome::NoRoute;
            };

            // Matched bytes equal the prefix up to ASCII case, so `found.len`
            // always falls on a char boundary of `key`.
            let forwarded = if route.remove_prefix() {
                &key[found.len..]
            } else {
                key
            };

            tracing::trace!(
                cluster = %route.cluster(),
                matched_len = found.len,
                remove_prefix = route.remove_prefix(),
                "Prefix route matched"
            );

            return RouteOutcome::Matched {
                target: Target {
                    pool: Arc::clone(pool),
                    route: Arc::clone(route),
                },
                key: forwarded,
            };
        }

        let Some(route) = self.table.catch_all() else {
            return RouteOutcome::NoRoute;
        };
        match self.upstreams.get(route.cluster()) {
            Some(pool) => RouteOutcome::CatchAll {
                target: Target {
                    pool: Arc::clone(pool),
                    route: Arc::clone(route),
                },
                key,
            },
            None => {
                tracing::debug!(cluster = %route.cluster(), "Catch-all cluster has no upstream");
                RouteOutcome::NoRoute
            }
        }
    }

    /// Route an owned key, stripping the matched prefix from it in place.
    pub fn route_in_place(&self, key: &mut String) -> Option<Target> {
        let (target, stripped) = match self.route(key.as_str()) {
            RouteOutcome::Matched { target, key: rest } => (target, key.len() - rest.len()),
            RouteOutcome::CatchAll { target, .. } => (target, 0),
            RouteOutcome::NoRoute => return None,
        };
        if stripped > 0 {
            key.drain(..stripped);
        }
        Some(target)
    }

    /// Route `key` for `command` and pick the mirror pools for it.
    pub fn dispatch<'k>(&self, command: &str, key: &'k str) -> Result<Dispatch<'k>, NoUpstream> {
        let (target, key) = match self.route(key) {
            RouteOutcome::Matched { target, key } | RouteOutcome::CatchAll { target, key } => {
                (target, key)
            }
            RouteOutcome::NoRoute => return Err(NoUpstream),
        };

        let mirrors = self.mirror_pools(&target.route, command);
        Ok(Dispatch {
            primary: target.pool,
            mirrors,
            key,
            route: target.route,
        })
    }

    /// Pools that should receive a copy of `command` routed via `route`.
    ///
    /// Mirror clusters missing from the registry are skipped.
    pub fn mirror_pools(&self, route: &Route, command: &str) -> Vec<PoolHandle> {
        let mut pools = Vec::new();
        for policy in route.mirror_policies() {
            let Some(pool) = self.upstreams.get(policy.cluster()) else {
                tracing::debug!(cluster = %policy.cluster(), "Mirror cluster has no upstream");
                continue;
            };
            if policy.should_mirror(command) {
                metrics::record_mirror(policy.cluster_label());
                pools.push(Arc::clone(pool));
            }
        }
        pools
    }
}
