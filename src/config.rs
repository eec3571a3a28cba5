//! Configuration loading.
//!
//! Configuration is loaded from a TOML file with the following resolution order:
//! 1. An explicit path (e.g. the CLI `--config` flag); it must exist
//! 2. `<config dir>/skald/config.toml` (`~/.config/skald/config.toml` on Linux)
//! 3. `~/.skald/config.toml`
//! 4. Built-in defaults
//!
//! Every table and key is optional:
//!
//! ```toml
//! [cache]
//! enabled = true
//! max_entries = 1000
//! max_age_days = 30
//! cleanup_interval_hours = 24
//!
//! [stats]
//! path = "/var/lib/skald/usage_stats.json"
//!
//! [limits]
//! max_concurrent_generations = 5
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cache::CacheConfig;
use crate::limiter::LimitsConfig;
use crate::stats::StatsConfig;
use crate::{Result, SkaldError};

/// Library configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub stats: StatsConfig,
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Falls back to defaults when no file exists. A file that exists but
    /// cannot be read or parsed is a configuration error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from one file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SkaldError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            SkaldError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Resolve the config file path, or `None` to use defaults.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(SkaldError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }
        Ok(first_existing(Self::search_paths()))
    }

    /// Implicit config locations, in priority order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("skald").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".skald").join("config.toml"));
        }
        paths
    }
}

fn first_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.cache.max_age_days, 30);
        assert_eq!(config.cache.cleanup_interval_hours, 24);
        assert_eq!(config.limits.max_concurrent_generations, 5);
        assert!(config.stats.path.ends_with("skald/usage_stats.json"));
    }

    #[test]
    fn parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
            [cache]
            max_entries = 50
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.max_entries, 50);
        // Defaults preserved
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_age_days, 30);
        assert_eq!(config.limits.max_concurrent_generations, 5);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [cache]
            enabled = false
            max_entries = 10
            max_age_days = 7
            cleanup_interval_hours = 1
            path = "/tmp/skald/messages.json"

            [stats]
            path = "/tmp/skald/usage_stats.json"

            [limits]
            max_concurrent_generations = 2
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_entries, 10);
        assert_eq!(config.cache.max_age_days, 7);
        assert_eq!(config.cache.cleanup_interval_hours, 1);
        assert_eq!(config.cache.path, PathBuf::from("/tmp/skald/messages.json"));
        assert_eq!(config.stats.path, PathBuf::from("/tmp/skald/usage_stats.json"));
        assert_eq!(config.limits.max_concurrent_generations, 2);
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[limits]\nmax_concurrent_generations = 9\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.limits.max_concurrent_generations, 9);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, SkaldError::Configuration(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cache\nenabled = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, SkaldError::Configuration(_)));
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn wrong_type_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[limits]\nmax_concurrent_generations = \"many\"\n").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    fn first_existing_skips_missing_and_directories() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        let a_dir = dir.path().join("dir.toml");
        fs::create_dir(&a_dir).unwrap();
        let real = dir.path().join("real.toml");
        fs::write(&real, "").unwrap();
        let later = dir.path().join("later.toml");
        fs::write(&later, "").unwrap();

        assert_eq!(
            first_existing([missing.clone(), a_dir, real.clone(), later]),
            Some(real)
        );
        assert_eq!(first_existing([missing]), None);
    }

    #[test]
    fn search_paths_prefer_config_dir() {
        let paths = Config::search_paths();
        if let (Some(dir), Some(first)) = (dirs::config_dir(), paths.first()) {
            assert_eq!(first, &dir.join("skald").join("config.toml"));
        }
        assert!(paths.iter().all(|p| p.ends_with("config.toml")));
    }
}
