//! Persisted watcher configuration
//!
//! One JSON file under `~/.config/tracker-monitor/`. The poll loop reloads
//! it at every tick so CLI edits apply live; only `last_tid` is written
//! back from the loop side, via read-modify-write so a concurrent option
//! edit isn't clobbered.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::event::TrackedItem;

fn default_ping_ms() -> u64 {
    4000
}

fn default_host() -> String {
    "https://tw.fxtm.com".to_string()
}

/// Watcher configuration, read at every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Cursor persisted after each successful fetch
    #[serde(default)]
    pub last_tid: u64,
    /// Poll interval in milliseconds
    #[serde(default = "default_ping_ms")]
    pub ping_ms: u64,
    /// Tracker host, scheme included
    #[serde(default = "default_host")]
    pub tw_host: String,
    /// Watch list; empty means "everything"
    #[serde(default)]
    pub tracked: Vec<TrackedItem>,
    /// Replace the unread counter with comment-preview notifications
    #[serde(default)]
    pub show_previews: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            last_tid: 0,
            ping_ms: default_ping_ms(),
            tw_host: default_host(),
            tracked: Vec::new(),
            show_previews: false,
        }
    }
}

/// Reads and writes the config file
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Self {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tracker-monitor");

        Self { dir }
    }

    /// Store rooted at an explicit directory, for tests
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join("config.json")
    }

    /// Where the badge file lives; status bars read the count from here
    pub fn badge_path(&self) -> PathBuf {
        self.dir.join("badge")
    }

    /// Load the config, falling back to defaults when the file is absent
    pub fn load(&self) -> Result<Config> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let content = serde_json::to_string_pretty(config)?;
        fs::write(self.config_path(), content)
            .with_context(|| format!("failed to write {}", self.config_path().display()))
    }

    /// Persist an advanced cursor without disturbing other fields
    pub fn save_last_tid(&self, tid: u64) -> Result<()> {
        let mut config = self.load()?;
        config.last_tid = tid;
        self.save(&config)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
