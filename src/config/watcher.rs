//! Configuration file watcher for hot reload.
//!
//! # Design Decisions
//! - The notify callback only signals; reading and parsing happen on a Tokio
//!   task once the file has been quiet for a short period, so a save that
//!   truncates before writing is read once, complete
//! - Content identical to the last forwarded configuration is not re-sent

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::RouterConfig;

/// Default time the file must stay unchanged before it is reloaded.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Monitors the configuration file and emits every new valid configuration.
pub struct ConfigWatcher {
    path: PathBuf,
    quiet_period: Duration,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                quiet_period: DEFAULT_QUIET_PERIOD,
                update_tx,
            },
            update_rx,
        )
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Start watching. The returned watcher must be kept alive; dropping it
    /// stops the reload task.
    ///
    /// The parent directory is watched so that editors which replace the
    /// file by rename are still picked up. Invalid configurations are logged
    /// and never forwarded.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (change_tx, change_rx) = mpsc::unbounded_channel::<()>();
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !is_content_change(&event.kind) {
                        return;
                    }
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config {
                        let _ = change_tx.send(());
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let watch_root = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        let current = std::fs::read_to_string(&self.path).ok();
        tokio::spawn(reload_when_quiet(
            self.path.clone(),
            self.quiet_period,
            current,
            change_rx,
            self.update_tx,
        ));

        tracing::info!(
            path = ?self.path,
            quiet_ms = self.quiet_period.as_millis() as u64,
            "Config watcher started"
        );
        Ok(watcher)
    }
}

async fn reload_when_quiet(
    path: PathBuf,
    quiet_period: Duration,
    mut last_sent: Option<String>,
    mut changes: mpsc::UnboundedReceiver<()>,
    updates: mpsc::UnboundedSender<RouterConfig>,
) {
    while changes.recv().await.is_some() {
        // Every further change restarts the quiet period.
        loop {
            match tokio::time::timeout(quiet_period, changes.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(
                    path = ?path,
                    error = %e,
                    "Failed to read config, keeping current configuration"
                );
                continue;
            }
        };
        if last_sent.as_deref() == Some(content.as_str()) {
            tracing::debug!(path = ?path, "Config file unchanged, skipping reload");
            continue;
        }

        tracing::info!(path = ?path, "Config file change detected, reloading");
        match parse_config(&content) {
            Ok(new_config) => {
                last_sent = Some(content);
                if updates.send(new_config).is_err() {
                    tracing::debug!("Config update receiver dropped");
                    return;
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to reload config, keeping current configuration"
                );
            }
        }
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}
