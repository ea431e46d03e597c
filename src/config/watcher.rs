//! Configuration file watcher for hot reload.
//!
//! A single save produces a burst of events and may briefly leave the file
//! truncated. Events are debounced by [`RELOAD_DEBOUNCE`] and an empty file is
//! never applied, since every [`GateConfig`] section has defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::GateConfig;

/// Quiet period after the last file event before the file is read.
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(200);

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    bind_override: Option<String>,
    update_tx: mpsc::UnboundedSender<GateConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GateConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                bind_override: None,
                update_tx,
            },
            update_rx,
        )
    }

    /// Keep a command-line listener address on every reloaded config.
    pub fn with_bind_override(mut self, bind: Option<String>) -> Self {
        self.bind_override = bind;
        self
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to flow; dropping
    /// it also stops the reload thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (event_tx, event_rx) = std_mpsc::channel::<()>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        let _ = event_tx.send(());
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        let Self {
            path,
            bind_override,
            update_tx,
        } = self;
        tracing::info!(path = ?path, "Config watcher started");

        std::thread::Builder::new()
            .name("config-reload".into())
            .spawn(move || {
                while event_rx.recv().is_ok() {
                    // Swallow the rest of the burst.
                    loop {
                        match event_rx.recv_timeout(RELOAD_DEBOUNCE) {
                            Ok(()) => continue,
                            Err(RecvTimeoutError::Timeout) => break,
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    }

                    tracing::info!(path = ?path, "Config file change detected, reloading");
                    match read_update(&path, bind_override.as_deref()) {
                        Ok(Some(config)) => {
                            if update_tx.send(config).is_err() {
                                return;
                            }
                        }
                        Ok(None) => {
                            tracing::debug!(path = ?path, "Config file is empty, waiting for the write to finish");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
            })
            .map_err(notify::Error::io)?;

        Ok(watcher)
    }
}

/// Read the file for a reload. `Ok(None)` means the file is empty, which is
/// a write in progress rather than a request to reset to defaults.
pub fn read_update(path: &Path, bind_override: Option<&str>) -> Result<Option<GateConfig>, ConfigError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    let mut config = parse_config(&content)?;
    if let Some(bind) = bind_override {
        config.listener.bind_address = bind.to_string();
    }
    Ok(Some(config))
}
