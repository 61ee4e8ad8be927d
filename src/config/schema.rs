//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the prefix router.
///
/// `[prefix_routes]` is required; a file without it is rejected rather than
/// loaded as an empty table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RouterConfig {
    /// Prefix route table definition.
    pub prefix_routes: PrefixRoutesConfig,

    /// Upstream cluster inventory used to build pool handles.
    #[serde(default)]
    pub upstreams: Vec<UpstreamConfig>,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Prefix routing table configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PrefixRoutesConfig {
    /// Ordered list of prefix rules.
    pub routes: Vec<PrefixRouteConfig>,

    /// Compare prefixes and keys after ASCII lowercasing.
    pub case_insensitive: bool,

    /// Fallback route used when no prefix matches.
    pub catch_all_route: Option<CatchAllRouteConfig>,
}

/// A single prefix rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrefixRouteConfig {
    /// Key prefix to match.
    pub prefix: String,

    /// Cluster that receives matching commands.
    pub cluster: String,

    /// Strip the matched prefix from the key before forwarding.
    #[serde(default)]
    pub remove_prefix: bool,

    /// Clusters that receive a copy of matching commands.
    #[serde(default)]
    pub request_mirror_policy: Vec<MirrorPolicyConfig>,
}

impl PrefixRouteConfig {
    pub fn new(prefix: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            cluster: cluster.into(),
            remove_prefix: false,
            request_mirror_policy: Vec::new(),
        }
    }

    /// Builder-style toggle for `remove_prefix`.
    pub fn with_remove_prefix(mut self, remove_prefix: bool) -> Self {
        self.remove_prefix = remove_prefix;
        self
    }

    /// Builder-style append of a mirror policy.
    pub fn with_mirror(mut self, mirror: MirrorPolicyConfig) -> Self {
        self.request_mirror_policy.push(mirror);
        self
    }
}

/// Catch-all route. Never strips the key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatchAllRouteConfig {
    /// Cluster that receives unmatched commands.
    pub cluster: String,

    /// Clusters that receive a copy of unmatched commands.
    #[serde(default)]
    pub request_mirror_policy: Vec<MirrorPolicyConfig>,
}

impl CatchAllRouteConfig {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            request_mirror_policy: Vec::new(),
        }
    }
}

/// Request mirroring policy attached to a route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MirrorPolicyConfig {
    /// Cluster that receives the mirrored command.
    pub cluster: String,

    /// Only mirror write commands.
    #[serde(default)]
    pub exclude_read_commands: bool,

    /// Percentage of eligible commands to mirror (0.0 - 100.0).
    #[serde(default = "default_mirror_percent")]
    pub percent: f64,
}

impl MirrorPolicyConfig {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            exclude_read_commands: false,
            percent: default_mirror_percent(),
        }
    }
}

fn default_mirror_percent() -> f64 {
    100.0
}

/// Upstream cluster definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Cluster name referenced by routes.
    pub name: String,

    /// Backend endpoints (e.g., "127.0.0.1:6379").
    #[serde(default)]
    pub endpoints: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
