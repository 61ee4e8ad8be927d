//! Upstream registry.
//!
//! # Data Flow
//! ```text
//! Owner resolves cluster inventory
//!     → ConnectionPool handles (Arc, shared)
//!     → Upstreams (cluster name → handle)
//!     → shared via Arc with the router
//!
//! Route matched → cluster name
//!     → Upstreams::get
//!     → pool handle, or "no route" if absent
//! ```
//!
//! # Design Decisions
//! - The router only reads the registry; it never inserts or copies handles
//! - Handles are reference-counted so callers keep them across reloads
//! - Pool internals (sockets, health, host selection) live behind the trait

pub mod static_pool;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use static_pool::StaticPool;

/// Identifier naming an upstream cluster.
pub type ClusterId = String;

/// A backend connection pool the router can hand commands to.
pub trait ConnectionPool: Send + Sync + fmt::Debug {
    /// Name of the cluster this pool serves.
    fn cluster(&self) -> &str;
}

/// Shared handle to a connection pool.
pub type PoolHandle = Arc<dyn ConnectionPool>;

/// Mapping from cluster name to pool handle.
#[derive(Debug, Clone, Default)]
pub struct Upstreams {
    pools: HashMap<ClusterId, PoolHandle>,
}

impl Upstreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool, returning the handle it replaced.
    pub fn insert(
        &mut self,
        cluster: impl Into<ClusterId>,
        pool: PoolHandle,
    ) -> Option<PoolHandle> {
        self.pools.insert(cluster.into(), pool)
    }

    pub fn get(&self, cluster: &str) -> Option<&PoolHandle> {
        self.pools.get(cluster)
    }

    pub fn contains(&self, cluster: &str) -> bool {
        self.pools.contains_key(cluster)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Registered cluster names, sorted.
    pub fn cluster_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<(ClusterId, PoolHandle)> for Upstreams {
    fn from_iter<I: IntoIterator<Item = (ClusterId, PoolHandle)>>(iter: I) -> Self {
        Self {
            pools: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_share_the_handle() {
        let pool: PoolHandle = Arc::new(StaticPool::new("cache", Vec::new()));
        let mut upstreams = Upstreams::new();
        assert!(upstreams.insert("cache", pool.clone()).is_none());

        let found = upstreams.get("cache").unwrap();
        assert!(Arc::ptr_eq(found, &pool));
        assert!(upstreams.contains("cache"));
        assert!(!upstreams.contains("other"));
        assert_eq!(upstreams.len(), 1);
    }

    #[test]
    fn cluster_names_sorted() {
        let upstreams: Upstreams = ["b", "a", "c"]
            .into_iter()
            .map(|name| {
                let pool: PoolHandle = Arc::new(StaticPool::new(name, Vec::new()));
                (name.to_string(), pool)
            })
            .collect();
        assert_eq!(upstreams.cluster_names(), vec!["a", "b", "c"]);
    }
}
