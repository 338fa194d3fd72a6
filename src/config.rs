// src/config.rs
// =============================================================================
// Process configuration, read once at startup.
//
// Sources, lowest precedence first:
// 1. Built-in defaults
// 2. An optional TOML file (--config / PAGE_INSPECTOR_CONFIG)
// 3. Individual CLI flags / environment variables
//
// The resulting AppConfig is handed explicitly to the verification pool, the
// analyzer engine and the fetcher. Nothing reads it through a global.
// =============================================================================

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_SERVICE_PORT: u16 = 8080;
const DEFAULT_THREAD_COUNT: usize = 10;
const DEFAULT_LINK_TIMEOUT_MS: u64 = 3000;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Port the HTTP API listens on
    pub service_port: u16,
    /// Number of link verification workers (process-wide)
    pub thread_count: usize,
    /// Timeout for a single link probe
    pub link_timeout_ms: u64,
    /// Timeout for fetching the page under analysis
    pub fetch_timeout_ms: u64,
    /// Number of analyzer dispatch workers per request
    pub dispatch_parallelism: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_port: DEFAULT_SERVICE_PORT,
            thread_count: DEFAULT_THREAD_COUNT,
            link_timeout_ms: DEFAULT_LINK_TIMEOUT_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            dispatch_parallelism: default_dispatch_parallelism(),
        }
    }
}

fn default_dispatch_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Per-value overrides coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub service_port: Option<u16>,
    pub thread_count: Option<usize>,
    pub link_timeout_ms: Option<u64>,
    pub fetch_timeout_ms: Option<u64>,
    pub dispatch_parallelism: Option<usize>,
}

impl AppConfig {
    /// Loads the config file (if any), applies overrides and validates.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(port) = overrides.service_port {
            self.service_port = port;
        }
        if let Some(count) = overrides.thread_count {
            self.thread_count = count;
        }
        if let Some(ms) = overrides.link_timeout_ms {
            self.link_timeout_ms = ms;
        }
        if let Some(ms) = overrides.fetch_timeout_ms {
            self.fetch_timeout_ms = ms;
        }
        if let Some(n) = overrides.dispatch_parallelism {
            self.dispatch_parallelism = n;
        }
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.link_timeout_ms == 0 {
            self.link_timeout_ms = DEFAULT_LINK_TIMEOUT_MS;
        }
        if self.fetch_timeout_ms == 0 {
            self.fetch_timeout_ms = DEFAULT_FETCH_TIMEOUT_MS;
        }
        if self.thread_count == 0 {
            return Err(ConfigError::Invalid("thread_count must be at least 1".into()));
        }
        if self.dispatch_parallelism == 0 {
            return Err(ConfigError::Invalid(
                "dispatch_parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn link_timeout(&self) -> Duration {
        Duration::from_millis(self.link_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::load(None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.service_port, 8080);
        assert_eq!(config.thread_count, 10);
        assert_eq!(config.link_timeout(), Duration::from_millis(3000));
        assert!(config.dispatch_parallelism >= 1);
    }

    #[test]
    fn test_file_with_partial_keys_and_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "thread_count = 4\nlink_timeout_ms = 0\nservice_port = 9000").unwrap();

        let overrides = ConfigOverrides {
            service_port: Some(9100),
            ..Default::default()
        };
        let config = AppConfig::load(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.thread_count, 4);
        // Zero timeout falls back to the default
        assert_eq!(config.link_timeout_ms, 3000);
        // CLI beats the file
        assert_eq!(config.service_port, 9100);
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let overrides = ConfigOverrides {
            thread_count: Some(0),
            ..Default::default()
        };
        let err = AppConfig::load(None, &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unparsable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "thread_count = \"many\"").unwrap();
        let err = AppConfig::load(Some(file.path()), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
