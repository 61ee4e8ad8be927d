//! Validated prefix route table.
//!
//! # Responsibilities
//! - Normalize configured prefixes (lowercase when case-insensitive)
//! - Reject duplicate normalized prefixes at construction
//! - Answer longest-prefix queries
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Cluster names are NOT checked against the upstream inventory here;
//!   an unknown cluster surfaces as "no route" at lookup time
//! - Case folding is ASCII-only so a matched length is also a valid
//!   split point in the original key

use std::sync::Arc;
use thiserror::Error;

use crate::config::schema::PrefixRoutesConfig;
use crate::routing::route::Route;
use crate::routing::trie::PrefixTrie;

/// Route table construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    /// Two rules normalize to the same prefix.
    #[error("prefix `{prefix}` already exists.")]
    DuplicatePrefix { prefix: String },

    /// A rule with an empty prefix could never match.
    #[error("route to cluster `{cluster}` has an empty prefix.")]
    EmptyPrefix { cluster: String },
}

/// Longest match found in the table.
#[derive(Debug, Clone, Copy)]
pub struct PrefixMatch<'t> {
    /// Matched length in bytes of the lookup key.
    pub len: usize,
    pub route: &'t Arc<Route>,
}

/// Immutable mapping from normalized prefix to route.
#[derive(Debug)]
pub struct RouteTable {
    prefixes: PrefixTrie<Arc<Route>>,
    catch_all: Option<Arc<Route>>,
    case_insensitive: bool,
}

impl RouteTable {
    /// Build the table from configuration.
    ///
    /// Rules are inserted in declaration order; the first rule whose
    /// normalized prefix is already present fails the whole build.
    pub fn new(config: &PrefixRoutesConfig) -> Result<Self, RouteTableError> {
        let case_insensitive = config.case_insensitive;
        let mut prefixes = PrefixTrie::new();

        for rule in &config.routes {
            if rule.prefix.is_empty() {
                return Err(RouteTableError::EmptyPrefix {
                    cluster: rule.cluster.clone(),
                });
            }

            let normalized = normalize_prefix(&rule.prefix, case_insensitive);
            let route = Arc::new(Route::from_prefix_config(rule, normalized.clone()));

            if prefixes.try_insert(normalized.as_bytes(), route).is_err() {
                tracing::debug!(prefix = %normalized, "Duplicate prefix in route table");
                return Err(RouteTableError::DuplicatePrefix { prefix: normalized });
            }
        }

        let catch_all = config
            .catch_all_route
            .as_ref()
            .map(|c| Arc::new(Route::from_catch_all_config(c)));

        tracing::debug!(
            routes = prefixes.len(),
            catch_all = catch_all.as_ref().map(|r| r.cluster()),
            case_insensitive,
            "Route table built"
        );

        Ok(Self {
            prefixes,
            catch_all,
            case_insensitive,
        })
    }

    /// Longest configured prefix of `key`, if any.
    pub fn longest_match(&self, key: &str) -> Option<PrefixMatch<'_>> {
        self.prefixes
            .longest_prefix(key.as_bytes(), self.case_insensitive)
            .map(|(len, route)| PrefixMatch { len, route })
    }

    /// Route registered under an exact (already normalized) prefix.
    pub fn get(&self, normalized_prefix: &str) -> Option<&Arc<Route>> {
        self.prefixes.get(normalized_prefix.as_bytes())
    }

    pub fn catch_all(&self) -> Option<&Arc<Route>> {
        self.catch_all.as_ref()
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Number of prefix rules (the catch-all is not counted).
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Length in bytes of the longest configured prefix.
    pub fn max_prefix_len(&self) -> usize {
        self.prefixes.max_key_len()
    }
}

/// Normalize a configured prefix for indexing.
pub fn normalize_prefix(prefix: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        prefix.to_ascii_lowercase()
    } else {
        prefix.to_string()
    }
}
