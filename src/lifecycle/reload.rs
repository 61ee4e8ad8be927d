//! Configuration reload loop.
//!
//! # Responsibilities
//! - Receive validated configurations from the watcher
//! - Rebuild upstreams and routes, then swap them in atomically
//! - Stop on shutdown

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::loader::unknown_clusters;
use crate::config::schema::RouterConfig;
use crate::lifecycle::shutdown::ShutdownListener;
use crate::routing::SharedRouter;
use crate::upstream::Upstreams;

/// Apply configuration updates to `shared` until shutdown or the update
/// channel closes. Returns the number of successful reloads.
pub async fn run_reload_loop(
    shared: Arc<SharedRouter>,
    mut updates: mpsc::UnboundedReceiver<RouterConfig>,
    mut shutdown: ShutdownListener,
) -> usize {
    let mut applied = 0;
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else {
                    tracing::debug!("Config update channel closed");
                    break;
                };
                if apply(&shared, &config) {
                    applied += 1;
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Reload loop received shutdown signal, exiting");
                break;
            }
        }
    }
    applied
}

fn apply(shared: &SharedRouter, config: &RouterConfig) -> bool {
    let upstreams = Arc::new(Upstreams::from_configs(&config.upstreams));
    for cluster in unknown_clusters(config, &upstreams) {
        tracing::warn!(
            cluster = %cluster,
            "Route references cluster without upstream; lookups will miss"
        );
    }
    shared.reload(&config.prefix_routes, upstreams).is_ok()
}
