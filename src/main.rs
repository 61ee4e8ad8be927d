//! kv-prefix-router
//!
//! Command-line front end for the prefix route table.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │                 PREFIX ROUTER                 │
//!                  │                                               │
//!   config.toml ───┼─▶ loader ─▶ validation ─▶ RouteTable ──┐      │
//!        │         │                                        ▼      │
//!        │         │                     Upstreams ─▶ PrefixRouter  │
//!        ▼         │                                        │      │
//!     watcher ─────┼─▶ reload loop ─▶ SharedRouter (swap) ◀─┘      │
//!                  │                        │                      │
//!   key ───────────┼────────────────────────▼                      │
//!                  │             Matched / CatchAll / NoRoute      │
//!                  └──────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use kv_prefix_router::config::loader::{build_router, load_config, unknown_clusters};
use kv_prefix_router::config::watcher::ConfigWatcher;
use kv_prefix_router::lifecycle::{input, reload::run_reload_loop, signals, Shutdown};
use kv_prefix_router::observability::{logging, metrics};
use kv_prefix_router::routing::{PrefixRouter, SharedRouter};

#[derive(Parser)]
#[command(name = "kv-prefix-router")]
#[command(about = "Longest-prefix key router for key-value proxies", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "kv-prefix-router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and build the route table
    Check,
    /// Print the routing decision for each key
    Route {
        /// Command name, used to evaluate mirror policies
        #[arg(long, default_value = "get")]
        command: String,
        /// Keys to route
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Route keys from stdin, hot-reloading the configuration on change
    Watch {
        /// Command name, used to evaluate mirror policies
        #[arg(long, default_value = "get")]
        command: String,
    },
}

/// One routing decision, printed as a JSON line.
#[derive(Debug, Serialize)]
struct Decision<'k> {
    /// Key as supplied.
    key: &'k str,
    outcome: &'static str,
    cluster: Option<String>,
    /// Key sent upstream, after any prefix strip.
    forwarded_key: Option<&'k str>,
    mirrors: Vec<String>,
}

impl<'k> Decision<'k> {
    fn new(router: &PrefixRouter, command: &str, key: &'k str) -> Self {
        let outcome = router.route(key);
        let mirrors = outcome
            .target()
            .map(|t| router.mirror_pools(&t.route, command))
            .unwrap_or_default();

        Self {
            key,
            outcome: outcome.kind(),
            cluster: outcome.pool().map(|p| p.cluster().to_string()),
            forwarded_key: outcome.key(),
            mirrors: mirrors.iter().map(|p| p.cluster().to_string()).collect(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => check(&cli.config),
        Commands::Route { command, keys } => route(&cli.config, &command, &keys),
        Commands::Watch { command } => watch(&cli.config, &command).await,
    }
}

fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    logging::init(&config.observability.log_level);

    let router = build_router(&config)?;
    for cluster in unknown_clusters(&config, router.upstreams()) {
        tracing::warn!(
            cluster = %cluster,
            "Route references cluster without upstream; lookups will miss"
        );
    }

    let table = router.table();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "status": "ok",
            "routes": table.len(),
            "case_insensitive": table.case_insensitive(),
            "catch_all": table.catch_all().map(|r| r.cluster()),
            "max_prefix_len": table.max_prefix_len(),
            "upstreams": router.upstreams().cluster_names(),
        }))?
    );
    Ok(())
}

fn route(path: &Path, command: &str, keys: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    logging::init(&config.observability.log_level);

    let router = build_router(&config)?;
    for key in keys {
        print_decision(&router, command, key)?;
    }
    Ok(())
}

async fn watch(path: &Path, command: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    logging::init(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = build_router(&config)?;
    for cluster in unknown_clusters(&config, router.upstreams()) {
        tracing::warn!(
            cluster = %cluster,
            "Route references cluster without upstream; lookups will miss"
        );
    }
    tracing::info!(routes = router.table().len(), "Route table loaded");

    let shared = Arc::new(SharedRouter::new(router));
    let shutdown = Shutdown::new();

    let (watcher, updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;
    let reload_task = tokio::spawn(run_reload_loop(
        Arc::clone(&shared),
        updates,
        shutdown.subscribe(),
    ));

    let mut lines = input::stdin_lines()?;
    let signal = signals::shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(Ok(key)) => {
                    let key = key.trim();
                    if !key.is_empty() {
                        print_decision(&shared.load(), command, key)?;
                    }
                }
                None => break,
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Failed to read key from stdin");
                    break;
                }
            },
            _ = &mut signal => break,
        }
    }

    shutdown.trigger();
    let reloads = reload_task.await?;
    tracing::info!(reloads, "Shutdown complete");
    Ok(())
}

fn print_decision(
    router: &PrefixRouter,
    command: &str,
    key: &str,
) -> Result<(), serde_json::Error> {
    let decision = Decision::new(router, command, key);
    println!("{}", serde_json::to_string(&decision)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kv_prefix_router::config::parse_config;
    use serde_json::json;

    const CONFIG: &str = r#"
        [[prefix_routes.routes]]
        prefix = "abc"
        cluster = "a"
        remove_prefix = true

        [[prefix_routes.routes.request_mirror_policy]]
        cluster = "shadow"
        exclude_read_commands = true

        [[upstreams]]
        name = "a"
        endpoints = []

        [[upstreams]]
        name = "shadow"
        endpoints = []
    "#;

    fn decision_json(command: &str, key: &str) -> serde_json::Value {
        let router = build_router(&parse_config(CONFIG).unwrap()).unwrap();
        serde_json::to_value(Decision::new(&router, command, key)).unwrap()
    }

    #[test]
    fn decision_reports_supplied_and_forwarded_key() {
        assert_eq!(
            decision_json("set", "abc:1"),
            json!({
                "key": "abc:1",
                "outcome": "matched",
                "cluster": "a",
                "forwarded_key": ":1",
                "mirrors": ["shadow"],
            })
        );
        assert_eq!(decision_json("get", "abc:1")["mirrors"], json!([]));
    }

    #[test]
    fn no_route_decision_has_nulls() {
        assert_eq!(
            decision_json("set", "zzz"),
            json!({
                "key": "zzz",
                "outcome": "no_route",
                "cluster": null,
                "forwarded_key": null,
                "mirrors": [],
            })
        );
    }
}
