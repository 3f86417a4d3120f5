use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::session::{
    SessionConfig, DEFAULT_LIST_LIMIT, DEFAULT_OVERSIZED_THRESHOLD, DEFAULT_PROGRESS_EVERY,
};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/netreplay.conf";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_CAPTURE_SECONDS: u64 = 60;
const DEFAULT_RETRY_DELAY_MS: u64 = 100;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interface to bind; `None` picks the first suitable one
    pub interface: Option<String>,
    pub poll_interval_ms: u64,
    pub capture_seconds: u64,
    pub oversized_threshold: usize,
    pub retry_delay_ms: u64,
    pub list_limit: usize,
    pub progress_every: usize,
    pub log: String,
    /// Unrecognized keys from the config file, reported once logging is up
    pub ignored_keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            interface: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            capture_seconds: DEFAULT_CAPTURE_SECONDS,
            oversized_threshold: DEFAULT_OVERSIZED_THRESHOLD,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            list_limit: DEFAULT_LIST_LIMIT,
            progress_every: DEFAULT_PROGRESS_EVERY,
            log: DEFAULT_LOG_FILTER.to_string(),
            ignored_keys: Vec::new(),
        }
    }
}

impl Config {
    /// Load from the config file (if present), then apply `NETREPLAY_*`
    /// environment overrides.
    ///
    /// The path comes from `path`, else `NETREPLAY_CONFIG`, else
    /// `/etc/netreplay.conf`. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(|| {
            std::env::var("NETREPLAY_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
        });

        let mut config = Config::default();

        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                    path: config_path.display().to_string(),
                    source,
                })?;
            config.apply_file(&content)?;
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `key = value` lines. Blank lines and `#` comments are skipped,
    /// unknown keys are collected in `ignored_keys`.
    fn apply_file(&mut self, content: &str) -> Result<(), ConfigError> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                self.set(key.trim(), value.trim())?;
            }
        }
        Ok(())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        const KEYS: [&str; 8] = [
            "interface",
            "poll_interval_ms",
            "capture_seconds",
            "oversized_threshold",
            "retry_delay_ms",
            "list_limit",
            "progress_every",
            "log",
        ];

        for key in KEYS {
            let var = format!("NETREPLAY_{}", key.to_uppercase());
            if let Some(value) = lookup(&var) {
                self.set(key, value.trim())?;
            }
        }
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "interface" => {
                self.interface = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            "poll_interval_ms" => self.poll_interval_ms = parse(key, value)?,
            "capture_seconds" => self.capture_seconds = parse(key, value)?,
            "oversized_threshold" => self.oversized_threshold = parse(key, value)?,
            "retry_delay_ms" => self.retry_delay_ms = parse(key, value)?,
            "list_limit" => self.list_limit = parse(key, value)?,
            "progress_every" => self.progress_every = parse(key, value)?,
            "log" => self.log = value.to_string(),
            _ => self.ignored_keys.push(key.to_string()),
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn capture_duration(&self) -> Duration {
        Duration::from_secs(self.capture_seconds)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            oversized_threshold: self.oversized_threshold,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            list_limit: self.list_limit,
            progress_every: self.progress_every,
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
