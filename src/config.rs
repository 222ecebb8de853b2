//! Store configuration

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the snapshot file
pub const SNAPSHOT_PATH_ENV: &str = "CHAT_STORE_SNAPSHOT_PATH";
/// Environment variable holding the autosave interval in seconds
pub const AUTOSAVE_SECS_ENV: &str = "CHAT_STORE_AUTOSAVE_SECS";

/// Configuration for a [`ChatStore`](crate::ChatStore)
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Where snapshots are read from and written to
    pub snapshot_path: Option<PathBuf>,
    /// How often the autosave task writes a snapshot
    pub autosave_interval: Option<Duration>,
    /// Capacity of the derived-event broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            autosave_interval: None,
            broadcast_capacity: 256,
        }
    }
}

impl StoreConfig {
    /// Create a config with defaults: no snapshot path, no autosave
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the environment.
    ///
    /// Relative snapshot paths are resolved against the current directory.
    /// Unparseable autosave values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var(SNAPSHOT_PATH_ENV) {
            config.snapshot_path = Some(resolve_path(&path));
        }

        if let Some(secs) = env::var(AUTOSAVE_SECS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            config.autosave_interval = Some(Duration::from_secs(secs));
        }

        config
    }

    /// Set the snapshot file path
    pub fn with_snapshot_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.snapshot_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the autosave interval
    pub fn with_autosave(mut self, interval: Duration) -> Self {
        self.autosave_interval = Some(interval);
        self
    }

    /// Set the derived-event channel capacity (at least 1)
    pub fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity.max(1);
        self
    }
}

fn resolve_path(path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}
