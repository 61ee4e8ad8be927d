//! Compiled routes and mirror policies.

use std::sync::Arc;

use crate::config::schema::{CatchAllRouteConfig, MirrorPolicyConfig, PrefixRouteConfig};
use crate::routing::commands::is_read_command;
use crate::upstream::ClusterId;

/// A compiled routing target.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    cluster: ClusterId,
    /// Normalized prefix; `None` for the catch-all route.
    prefix: Option<String>,
    remove_prefix: bool,
    mirror_policies: Vec<MirrorPolicy>,
}

impl Route {
    /// Compile a prefix rule whose prefix has already been normalized.
    pub(crate) fn from_prefix_config(
        config: &PrefixRouteConfig,
        normalized_prefix: String,
    ) -> Self {
        Self {
            cluster: config.cluster.clone(),
            prefix: Some(normalized_prefix),
            remove_prefix: config.remove_prefix,
            mirror_policies: config
                .request_mirror_policy
                .iter()
                .map(MirrorPolicy::from_config)
                .collect(),
        }
    }

    /// Compile the catch-all route. It never strips the key.
    pub(crate) fn from_catch_all_config(config: &CatchAllRouteConfig) -> Self {
        Self {
            cluster: config.cluster.clone(),
            prefix: None,
            remove_prefix: false,
            mirror_policies: config
                .request_mirror_policy
                .iter()
                .map(MirrorPolicy::from_config)
                .collect(),
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn remove_prefix(&self) -> bool {
        self.remove_prefix
    }

    pub fn is_catch_all(&self) -> bool {
        self.prefix.is_none()
    }

    pub fn mirror_policies(&self) -> &[MirrorPolicy] {
        &self.mirror_policies
    }
}

/// Sends a copy of routed commands to another cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorPolicy {
    /// Shared so metric labels can reuse it without copying.
    cluster: Arc<str>,
    exclude_read_commands: bool,
    percent: f64,
}

impl MirrorPolicy {
    pub fn from_config(config: &MirrorPolicyConfig) -> Self {
        Self {
            cluster: Arc::from(config.cluster.as_str()),
            exclude_read_commands: config.exclude_read_commands,
            percent: config.percent,
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub(crate) fn cluster_label(&self) -> &Arc<str> {
        &self.cluster
    }

    pub fn exclude_read_commands(&self) -> bool {
        self.exclude_read_commands
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Decide whether `command` is mirrored, sampling the configured percent.
    pub fn should_mirror(&self, command: &str) -> bool {
        self.should_mirror_with_sample(command, fastrand::f64() * 100.0)
    }

    /// Same as [`should_mirror`](Self::should_mirror) with an explicit sample
    /// in `[0, 100)`.
    pub fn should_mirror_with_sample(&self, command: &str, sample: f64) -> bool {
        if self.exclude_read_commands && is_read_command(command) {
            return false;
        }
        if self.percent >= 100.0 {
            return true;
        }
        if self.percent <= 0.0 {
            return false;
        }
        sample < self.percent
    }
}
