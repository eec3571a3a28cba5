//! Builder for configuring generator instances

use std::path::PathBuf;

use tracing::info;

use super::Generator;
use crate::Result;
use crate::cache::{CacheConfig, CommitCache};
use crate::config::Config;
use crate::limiter::{LimitsConfig, RateLimiter};
use crate::stats::{StatsConfig, StatsLedger};

/// Main entry point for creating generator instances.
pub struct Skald;

impl Skald {
    /// Create a new builder for configuring the generator.
    pub fn builder() -> SkaldBuilder {
        SkaldBuilder::new()
    }
}

/// Builder for configuring generator instances.
#[derive(Debug, Clone, Default)]
pub struct SkaldBuilder {
    cache: CacheConfig,
    stats: StatsConfig,
    limits: LimitsConfig,
}

impl SkaldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded [`Config`]; later setters override it.
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache: config.cache.clone(),
            stats: config.stats.clone(),
            limits: config.limits.clone(),
        }
    }

    /// Replace the cache configuration.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Turn caching off: every request goes to the provider.
    pub fn disable_cache(mut self) -> Self {
        self.cache.enabled = false;
        self
    }

    /// Where the commit cache is persisted.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache.path = path.into();
        self
    }

    /// Where the usage ledger is persisted.
    pub fn stats_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stats.path = path.into();
        self
    }

    /// Maximum provider calls in flight at once (default: 5).
    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.limits.max_concurrent_generations = n;
        self
    }

    /// Load the persisted stores and build the generator.
    ///
    /// # Errors
    ///
    /// Returns [`SkaldError::Configuration`](crate::SkaldError::Configuration)
    /// for a zero concurrency ceiling or a malformed cache or stats file.
    pub fn build(self) -> Result<Generator> {
        let limiter = RateLimiter::new(self.limits.max_concurrent_generations)?;
        let cache = CommitCache::open(self.cache)?;
        let ledger = StatsLedger::open(self.stats.path)?;

        info!(
            cache_enabled = cache.is_enabled(),
            cached = cache.len(),
            max_concurrent = limiter.max_concurrent(),
            "generator ready"
        );

        Ok(Generator::new(cache, ledger, limiter))
    }
}
