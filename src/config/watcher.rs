//! Configuration file watcher for hot reload.
//!
//! Only the provider section is swapped at runtime; listener and backend
//! changes need a restart.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::HubConfig;

/// Watches one config file and sends every valid revision.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<HubConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<HubConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let target = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_relevant(&event, &target) => reload(&target, &update_tx),
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Writes and re-creations of the watched file; editors often replace it.
fn is_relevant(event: &Event, target: &Path) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && (event.paths.is_empty() || event.paths.iter().any(|p| p.ends_with(target) || target.ends_with(p)))
}

fn reload(path: &Path, tx: &mpsc::UnboundedSender<HubConfig>) {
    match load_config(path) {
        Ok(config) => {
            tracing::info!(
                path = ?path,
                llm_key = config.providers.llm_api_key.is_some(),
                serp_key = config.providers.serp_api_key.is_some(),
                "Config file changed, provider settings reloaded"
            );
            let _ = tx.send(config);
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Config reload rejected, keeping current settings");
        }
    }
}
