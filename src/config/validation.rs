//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Detect conflicting prefixes under the configured case mode
//! - Validate value ranges (mirror percentages)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Routes referencing clusters absent from `[[upstreams]]` are NOT errors;
//!   they resolve to "no route" at lookup time

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::{MirrorPolicyConfig, RouterConfig};
use crate::routing::table::normalize_prefix;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no prefix routes or catch-all route configured")]
    NoRoutes,

    #[error("route #{index} has an empty prefix")]
    EmptyPrefix { index: usize },

    #[error("route `{prefix}` has an empty cluster name")]
    EmptyCluster { prefix: String },

    #[error("catch-all route has an empty cluster name")]
    EmptyCatchAllCluster,

    #[error("prefix `{prefix}` already exists.")]
    DuplicatePrefix { prefix: String },

    #[error("mirror policy on `{route}` has an empty cluster name")]
    EmptyMirrorCluster { route: String },

    #[error("mirror policy on `{route}` has percent {percent}, expected 0-100")]
    MirrorPercentOutOfRange { route: String, percent: f64 },

    #[error("upstream #{index} has an empty name")]
    EmptyUpstreamName { index: usize },

    #[error("upstream `{name}` is defined more than once")]
    DuplicateUpstream { name: String },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let routes = &config.prefix_routes;

    if routes.routes.is_empty() && routes.catch_all_route.is_none() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut seen = HashSet::new();
    for (index, route) in routes.routes.iter().enumerate() {
        if route.prefix.is_empty() {
            errors.push(ValidationError::EmptyPrefix { index });
        } else {
            let normalized = normalize_prefix(&route.prefix, routes.case_insensitive);
            if !seen.insert(normalized.clone()) {
                errors.push(ValidationError::DuplicatePrefix { prefix: normalized });
            }
        }

        if route.cluster.is_empty() {
            errors.push(ValidationError::EmptyCluster {
                prefix: route.prefix.clone(),
            });
        }

        check_mirrors(&route.prefix, &route.request_mirror_policy, &mut errors);
    }

    if let Some(catch_all) = &routes.catch_all_route {
        if catch_all.cluster.is_empty() {
            errors.push(ValidationError::EmptyCatchAllCluster);
        }
        check_mirrors("catch_all_route", &catch_all.request_mirror_policy, &mut errors);
    }

    let mut names = HashSet::new();
    for (index, upstream) in config.upstreams.iter().enumerate() {
        if upstream.name.is_empty() {
            errors.push(ValidationError::EmptyUpstreamName { index });
        } else if !names.insert(upstream.name.as_str()) {
            errors.push(ValidationError::DuplicateUpstream {
                name: upstream.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_mirrors(route: &str, mirrors: &[MirrorPolicyConfig], errors: &mut Vec<ValidationError>) {
    for mirror in mirrors {
        if mirror.cluster.is_empty() {
            errors.push(ValidationError::EmptyMirrorCluster {
                route: route.to_string(),
            });
        }
        if !(0.0..=100.0).contains(&mirror.percent) {
            errors.push(ValidationError::MirrorPercentOutOfRange {
                route: route.to_string(),
                percent: mirror.percent,
            });
        }
    }
}
