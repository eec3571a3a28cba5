//! The durable usage-statistics ledger.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::usage::UsageStats;
use crate::persist;
use crate::Result;
use crate::types::{GenerationEvent, ProviderId};

/// Where the ledger lives. Loadable from the `[stats]` table of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Stats file location. Default: `<config dir>/skald/usage_stats.json`.
    pub path: PathBuf,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            path: dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from(".config"))
                .join("skald")
                .join("usage_stats.json"),
        }
    }
}

/// Accumulates [`GenerationEvent`]s into [`UsageStats`] and keeps them on disk.
///
/// One lock guards the whole aggregate. `record` and `reset` hold it in
/// write mode across both the update and the file write, so concurrent
/// records serialize and the file always reflects some prefix of them.
/// Readers get deep copies and never see a half-applied event.
#[derive(Debug)]
pub struct StatsLedger {
    path: PathBuf,
    stats: RwLock<UsageStats>,
}

impl StatsLedger {
    /// Load the ledger at `path`.
    ///
    /// A missing or empty file starts a fresh ledger. A malformed file is a
    /// [`SkaldError::Configuration`](crate::SkaldError::Configuration) and no
    /// ledger is produced.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let stats = persist::load_json::<UsageStats>(&path)?.unwrap_or_default();
        debug!(
            path = %path.display(),
            total = stats.total_generations,
            "loaded usage stats"
        );
        Ok(Self {
            path,
            stats: RwLock::new(stats),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fold one event into the aggregates, then persist them.
    ///
    /// A persistence failure is returned, but the in-memory update stands.
    pub fn record(&self, event: GenerationEvent) -> Result<()> {
        let mut stats = self.write();
        stats.apply(&event);
        persist::save_json(&self.path, &*stats)
    }

    /// A deep copy of the current aggregates.
    pub fn snapshot(&self) -> UsageStats {
        self.read().clone()
    }

    /// The provider with the most recorded uses.
    pub fn most_used_provider(&self) -> Option<(ProviderId, u64)> {
        self.read().most_used_provider()
    }

    /// Overall success rate, as a percentage.
    pub fn overall_success_rate(&self) -> f64 {
        self.read().success_rate()
    }

    /// Overall failure rate, as a percentage.
    pub fn failure_rate(&self) -> f64 {
        self.read().failure_rate()
    }

    /// Cache hit rate over all recorded lookups, as a percentage.
    pub fn cache_hit_rate(&self) -> f64 {
        self.read().cache_hit_rate()
    }

    /// Providers ordered by descending use count.
    pub fn provider_ranking(&self) -> Vec<ProviderId> {
        self.read().provider_ranking()
    }

    /// Zero every aggregate and persist the empty ledger.
    pub fn reset(&self) -> Result<()> {
        let mut stats = self.write();
        *stats = UsageStats::default();
        info!(path = %self.path.display(), "reset usage stats");
        persist::save_json(&self.path, &*stats)
    }

    fn read(&self) -> RwLockReadGuard<'_, UsageStats> {
        self.stats.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, UsageStats> {
        self.stats.write().unwrap_or_else(PoisonError::into_inner)
    }
}
