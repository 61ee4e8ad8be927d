//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::{PrefixRouter, RouteTableError};
use crate::upstream::Upstreams;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Route table rejected: {0}")]
    Routes(#[from] RouteTableError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Build the upstream registry and router described by `config`.
pub fn build_router(config: &RouterConfig) -> Result<PrefixRouter, ConfigError> {
    let upstreams = Arc::new(Upstreams::from_configs(&config.upstreams));
    let router = PrefixRouter::from_config(&config.prefix_routes, upstreams)?;
    Ok(router)
}

/// Clusters referenced by routes, catch-all or mirrors that the upstream
/// inventory does not define. Sorted, without repeats.
pub fn unknown_clusters(config: &RouterConfig, upstreams: &Upstreams) -> Vec<String> {
    let routes = &config.prefix_routes;
    let mut referenced: Vec<&str> = Vec::new();

    for route in &routes.routes {
        referenced.push(&route.cluster);
        referenced.extend(route.request_mirror_policy.iter().map(|m| m.cluster.as_str()));
    }
    if let Some(catch_all) = &routes.catch_all_route {
        referenced.push(&catch_all.cluster);
        referenced.extend(catch_all.request_mirror_policy.iter().map(|m| m.cluster.as_str()));
    }

    let mut missing: Vec<String> = referenced
        .into_iter()
        .filter(|cluster| !upstreams.contains(cluster))
        .map(str::to_string)
        .collect();
    missing.sort_unstable();
    missing.dedup();
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = r#"
        [prefix_routes]
        [[prefix_routes.routes]]
        prefix = "user:"
        cluster = "users"

        [[prefix_routes.routes]]
        prefix = "tmp:"
        cluster = "scratch"

        [[prefix_routes.routes.request_mirror_policy]]
        cluster = "shadow"

        [prefix_routes.catch_all_route]
        cluster = "default"

        [[upstreams]]
        name = "users"
        endpoints = ["127.0.0.1:6379"]

        [[upstreams]]
        name = "default"
        endpoints = ["127.0.0.1:6380"]
    "#;

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.prefix_routes.routes.len(), 2);

        let router = build_router(&config).unwrap();
        assert_eq!(router.route("user:1").pool().unwrap().cluster(), "users");
        assert_eq!(router.route("other").pool().unwrap().cluster(), "default");
        // Referenced but not in the inventory.
        assert!(router.route("tmp:1").is_no_route());
    }

    #[test]
    fn reports_unknown_clusters() {
        let config = parse_config(CONFIG).unwrap();
        let upstreams = Upstreams::from_configs(&config.upstreams);
        assert_eq!(unknown_clusters(&config, &upstreams), vec!["scratch", "shadow"]);
    }

    #[test]
    fn validation_errors_are_joined() {
        let raw = r#"
            [[prefix_routes.routes]]
            prefix = "ab"
            cluster = "a"

            [[prefix_routes.routes]]
            prefix = "ab"
            cluster = "b"
        "#;
        let err = parse_config(raw).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: prefix `ab` already exists.");
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = parse_config("[prefix_routes]\ncase_insensitive = true\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: no prefix routes or catch-all route configured"
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/kv-prefix-router.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = parse_config("[prefix_routes\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
