//! Runtime configuration.
//!
//! Priority (highest first): CLI flags, `SWATCH_*` environment variables,
//! TOML file, built-in defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SwatchError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwatchConfig {
    /// Seconds a worker may hold a task before it is reclaimed.
    pub lease_secs: u64,

    /// Worker poll interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Number of worker loops to run.
    pub workers: usize,

    /// Root directory of the local blob store.
    pub storage_root: String,

    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for SwatchConfig {
    fn default() -> Self {
        Self {
            lease_secs: 120,
            poll_interval_ms: 1000,
            workers: 1,
            storage_root: "/tmp/swatch".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl SwatchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, SwatchError> {
        toml::from_str(s).map_err(|e| SwatchError::MalformedInput(format!("config: {e}")))
    }

    /// Read `path` if it exists, otherwise start from defaults. Environment
    /// overrides are applied either way.
    pub fn load(path: Option<&Path>) -> Result<Self, SwatchError> {
        let mut cfg = match path {
            Some(path) if path.exists() => {
                let s = std::fs::read_to_string(path).map_err(|e| {
                    SwatchError::MalformedInput(format!("config {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&s)?
            }
            _ => Self::default(),
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SwatchError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("SWATCH_LEASE_SECS") {
            self.lease_secs = parse_number("SWATCH_LEASE_SECS", &v)?;
        }
        if let Some(v) = non_empty("SWATCH_POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_number("SWATCH_POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = non_empty("SWATCH_WORKERS") {
            self.workers = parse_number("SWATCH_WORKERS", &v)?;
        }
        if let Some(v) = non_empty("SWATCH_STORAGE_ROOT") {
            self.storage_root = v;
        }
        if let Some(v) = non_empty("SWATCH_LOG") {
            self.log_filter = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SwatchError> {
        if self.lease_secs == 0 {
            return Err(SwatchError::MalformedInput("lease_secs must be > 0".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(SwatchError::MalformedInput(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(SwatchError::MalformedInput("workers must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn lease(&self) -> Duration {
        Duration::from_secs(self.lease_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, SwatchError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| SwatchError::MalformedInput(format!("{key}={raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_reference_timings() {
        let cfg = SwatchConfig::default();
        assert_eq!(cfg.lease(), Duration::from_secs(120));
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = SwatchConfig::from_toml_str("workers = 4\nlease_secs = 30\n").unwrap();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.lease_secs, 30);
        assert_eq!(cfg.poll_interval_ms, 1000);
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SWATCH_WORKERS", "3"),
            ("SWATCH_STORAGE_ROOT", "/var/swatch"),
            ("SWATCH_LOG", "   "),
        ]);
        let mut cfg = SwatchConfig::default();
        cfg.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.storage_root, "/var/swatch");
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn bad_env_number_is_malformed() {
        let mut cfg = SwatchConfig::default();
        let err = cfg
            .apply_env_overrides(|k| (k == "SWATCH_LEASE_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedInput);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let cfg = SwatchConfig {
            poll_interval_ms: 0,
            ..SwatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SwatchConfig::load(Some(&dir.path().join("missing.toml"))).unwrap();
        assert_eq!(cfg.lease_secs, SwatchConfig::default().lease_secs);
    }
}
