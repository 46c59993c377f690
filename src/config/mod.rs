//! Typed configuration.
//!
//! Precedence, lowest first: built-in defaults, an optional TOML file,
//! environment variables. Loads once at startup and fails fast on bad values.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root holding one directory per stage.
    pub data_dir: PathBuf,
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Bound of the move request queue.
    pub queue_capacity: usize,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            listen_addr: "0.0.0.0:8080".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            otel_endpoint: None,
            log_level: "info".to_string(),
        }
    }
}

/// Shape of the optional TOML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    listen_addr: Option<String>,
    queue_capacity: Option<usize>,
    otel_endpoint: Option<String>,
    log_level: Option<String>,
}

impl Config {
    /// Load configuration from environment variables over the defaults.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_vars(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load defaults, then `path` (if given), then environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = path {
            config.apply_file(path)?;
        }
        config.apply_vars(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let file: FileConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("bad config file {}: {e}", path.display())))?;

        if let Some(dir) = file.data_dir {
            self.data_dir = dir;
        }
        if let Some(addr) = file.listen_addr {
            self.listen_addr = addr;
        }
        if let Some(capacity) = file.queue_capacity {
            self.queue_capacity = validate_capacity(capacity)?;
        }
        if file.otel_endpoint.is_some() {
            self.otel_endpoint = file.otel_endpoint;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        Ok(())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = var("TRIAGE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(addr) = var("TRIAGE_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(raw) = var("TRIAGE_QUEUE_CAPACITY") {
            let capacity = raw.trim().parse::<usize>().map_err(|_| {
                Error::Config(format!("TRIAGE_QUEUE_CAPACITY is not a number: {raw:?}"))
            })?;
            self.queue_capacity = validate_capacity(capacity)?;
        }
        if let Some(endpoint) = var("OTEL_ENDPOINT") {
            self.otel_endpoint = Some(endpoint);
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }
}

fn validate_capacity(capacity: usize) -> Result<usize> {
    if capacity == 0 {
        return Err(Error::Config(
            "queue capacity must be greater than zero".to_string(),
        ));
    }
    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn vars_override_defaults() {
        let mut config = Config::default();
        config
            .apply_vars(vars(&[
                ("TRIAGE_DATA_DIR", "/srv/items"),
                ("TRIAGE_QUEUE_CAPACITY", "8"),
                ("LOG_LEVEL", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/items"));
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(config.otel_endpoint.is_none());
    }

    #[test]
    fn zero_or_garbage_capacity_is_rejected() {
        let mut config = Config::default();
        assert!(
            config
                .apply_vars(vars(&[("TRIAGE_QUEUE_CAPACITY", "0")]))
                .is_err()
        );
        assert!(
            config
                .apply_vars(vars(&[("TRIAGE_QUEUE_CAPACITY", "lots")]))
                .is_err()
        );
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }
}
