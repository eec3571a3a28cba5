//! Durable cache of generated commit messages.
//!
//! [`CommitCache`] maps a [`Fingerprint`] of (changes, provider, style,
//! attempt) to the message a provider produced for it, so asking again for
//! the same diff costs nothing.
//!
//! # Storage
//!
//! The whole cache is one pretty-printed JSON document at
//! [`CacheConfig::path`] holding the config snapshot and every entry keyed
//! by fingerprint. It is rewritten after every mutation. Deleting the file
//! is equivalent to [`CommitCache::clear`].
//!
//! # Locking
//!
//! A single mutex guards the entry map. Every operation, including the
//! file write that follows a mutation, runs under it without awaiting, so
//! readers never observe a half-applied update.
//!
//! # Eviction
//!
//! [`CommitCache::evict`] drops entries older than `max_age_days`, then the
//! least recently accessed ones until at most `max_entries` remain. It runs
//! after every store and on open once `cleanup_interval_hours` have passed
//! since the previous sweep. Lookups never evict; an entry past its age
//! limit simply reads as a miss until the next sweep removes it.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::fingerprint::Fingerprint;
use crate::persist;
use crate::telemetry;
use crate::types::{Generation, GenerationOptions, ProviderId, TokenUsage};
use crate::{Result, SkaldError};

/// On-disk format version.
const CACHE_FILE_VERSION: u32 = 1;

/// Configuration for the commit message cache.
///
/// Read once at startup. Loadable from the `[cache]` table of the config file.
///
/// ```rust
/// # use skald::CacheConfig;
/// let config = CacheConfig::new()
///     .max_entries(500)
///     .max_age_days(7)
///     .path("/tmp/skald-cache.json");
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false, every lookup misses and every store is a no-op. Default: true.
    pub enabled: bool,
    /// Maximum number of entries kept; 0 means unbounded. Default: 1,000.
    pub max_entries: usize,
    /// Entries older than this many days are evicted; 0 means never. Default: 30.
    pub max_age_days: u32,
    /// Minimum hours between sweeps triggered on open. Default: 24.
    pub cleanup_interval_hours: u32,
    /// Cache file location. Default: `<cache dir>/skald/messages.json`.
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1_000,
            max_age_days: 30,
            cleanup_interval_hours: 24,
            path: default_cache_path(),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A config whose cache never hits and never writes.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Enable or disable the cache.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the maximum entry age in days.
    pub fn max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    /// Set the minimum interval between sweeps on open.
    pub fn cleanup_interval_hours(mut self, hours: u32) -> Self {
        self.cleanup_interval_hours = hours;
        self
    }

    /// Set the cache file location.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}

/// Default cache path: `~/.cache/skald/messages.json`.
fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("skald")
        .join("messages.json")
}

/// One cached generation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub message: String,
    pub provider: ProviderId,
    pub fingerprint: Fingerprint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_instruction: Option<String>,
    #[serde(default)]
    pub attempt: u32,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    /// 1 after the generating store, +1 per hit. A lookup reports the count
    /// from before its own access.
    pub access_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,
}

impl CacheEntry {
    /// Build an entry for a fresh provider result.
    ///
    /// Timestamps and access count are (re)set by [`CommitCache::store`].
    pub fn new(
        fingerprint: Fingerprint,
        provider: ProviderId,
        options: &GenerationOptions,
        generation: &Generation,
    ) -> Self {
        let now = Utc::now();
        Self {
            message: generation.message.clone(),
            provider,
            fingerprint,
            style_instruction: options.style_instruction.clone(),
            attempt: options.attempt,
            created_at: now,
            last_accessed_at: now,
            access_count: 1,
            cost: generation.cost,
            tokens: generation.usage,
        }
    }

    /// Lookups served by this entry after the one that created it.
    pub fn hits(&self) -> u64 {
        self.access_count.saturating_sub(1)
    }
}

/// Aggregate view over the current entry set.
///
/// Always computed from the entries, never stored: each entry was created by
/// exactly one miss, and every further access was a hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_hits: u64,
    pub total_misses: u64,
    /// `hits / (hits + misses)`, 0 when there were no lookups.
    pub hit_rate: f64,
    /// Cost of the provider calls that hits avoided.
    pub total_cost_saved: f64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
    pub cache_size_bytes: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<Fingerprint, CacheEntry>,
    last_cleanup: Option<DateTime<Utc>>,
}

/// Owned form of the cache file, for loading.
#[derive(Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    last_cleanup: Option<DateTime<Utc>>,
    #[serde(default)]
    entries: HashMap<Fingerprint, CacheEntry>,
}

/// Borrowed form of the cache file, for saving without cloning entries.
#[derive(Serialize)]
struct CacheFileRef<'a> {
    version: u32,
    config: &'a CacheConfig,
    last_cleanup: Option<DateTime<Utc>>,
    entries: BTreeMap<&'a Fingerprint, &'a CacheEntry>,
}

/// Durable, fingerprint-keyed commit message cache.
///
/// Thread-safe; share behind an `Arc` or borrow from the owning generator.
pub struct CommitCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl CommitCache {
    /// Open the cache described by `config`.
    ///
    /// A missing or empty file yields an empty cache; a malformed one is a
    /// [`SkaldError::Configuration`]. A disabled cache never touches disk.
    pub fn open(config: CacheConfig) -> Result<Self> {
        let state = if config.enabled {
            Self::load_state(&config)?
        } else {
            CacheState::default()
        };

        let cache = Self {
            config,
            state: Mutex::new(state),
        };
        cache.sweep_if_due(Utc::now());
        Ok(cache)
    }

    /// Load the cache file at `config.path` for reading only.
    ///
    /// Unlike [`CommitCache::open`], the file is read even when `enabled`
    /// is false, and no sweep runs, so the file is left as found.
    pub fn inspect(config: CacheConfig) -> Result<Self> {
        let state = Self::load_state(&config)?;
        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    fn load_state(config: &CacheConfig) -> Result<CacheState> {
        let mut state = CacheState::default();
        let Some(file) = persist::load_json::<CacheFile>(&config.path)? else {
            return Ok(state);
        };
        if file.version > CACHE_FILE_VERSION {
            return Err(SkaldError::Configuration(format!(
                "unsupported cache file version {} (max supported: {CACHE_FILE_VERSION})",
                file.version
            )));
        }
        state.last_cleanup = file.last_cleanup;
        state.entries = file
            .entries
            .into_iter()
            .map(|(fp, mut entry)| {
                entry.fingerprint = fp.clone();
                (fp, entry)
            })
            .collect();
        Ok(state)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a cached message.
    ///
    /// On a hit, returns a copy of the entry as it stood before this access,
    /// then bumps the stored access count and access time. The first lookup
    /// after a store therefore sees `access_count == 1`. Returns `None` on a
    /// miss, for an entry past its age limit, or when the cache is disabled.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        self.lookup_at(fingerprint, Utc::now())
    }

    fn lookup_at(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Option<CacheEntry> {
        if !self.config.enabled {
            return None;
        }
        let mut state = self.lock();
        let entry = state.entries.get_mut(fingerprint)?;
        if self.is_expired(entry, now) {
            debug!(%fingerprint, "cache entry expired, treating as miss");
            return None;
        }
        let hit = entry.clone();
        entry.access_count += 1;
        entry.last_accessed_at = now;

        // Access metadata is best-effort durable; the hit itself stands.
        if let Err(e) = self.persist(&state) {
            warn!(error = %e, "failed to persist cache access");
            metrics::counter!(telemetry::PERSIST_FAILURES_TOTAL, "store" => "cache").increment(1);
        }
        Some(hit)
    }

    /// Insert or overwrite the entry at `entry.fingerprint`.
    ///
    /// Resets `access_count` to 1 and both timestamps to now, sweeps, then
    /// persists. A persistence failure is returned but the in-memory entry
    /// is kept.
    pub fn store(&self, entry: CacheEntry) -> Result<()> {
        self.store_at(entry, Utc::now())
    }

    fn store_at(&self, mut entry: CacheEntry, now: DateTime<Utc>) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        entry.created_at = now;
        entry.last_accessed_at = now;
        entry.access_count = 1;

        let mut state = self.lock();
        state.entries.insert(entry.fingerprint.clone(), entry);
        let evicted = self.evict_locked(&mut state, now);
        if evicted > 0 {
            debug!(evicted, "evicted cache entries on store");
        }
        self.persist(&state)
    }

    /// Apply the age and capacity limits now, persisting if anything was
    /// removed. Returns the number of evicted entries.
    pub fn evict(&self) -> Result<usize> {
        self.evict_at(Utc::now())
    }

    fn evict_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut state = self.lock();
        let evicted = self.evict_locked(&mut state, now);
        if evicted > 0 && self.config.enabled {
            self.persist(&state)?;
        }
        Ok(evicted)
    }

    /// Compute aggregate statistics over the current entries.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let mut stats = CacheStats {
            total_entries: state.entries.len(),
            total_misses: state.entries.len() as u64,
            ..CacheStats::default()
        };
        for entry in state.entries.values() {
            let hits = entry.hits();
            stats.total_hits += hits;
            stats.total_cost_saved += entry.cost.unwrap_or(0.0) * hits as f64;
        }
        stats.oldest_entry = state.entries.values().map(|e| e.created_at).min();
        stats.newest_entry = state.entries.values().map(|e| e.created_at).max();
        let attempts = stats.total_hits + stats.total_misses;
        if attempts > 0 {
            stats.hit_rate = stats.total_hits as f64 / attempts as f64;
        }
        stats.cache_size_bytes = fs::metadata(&self.config.path).map_or(0, |m| m.len());
        stats
    }

    /// Remove every entry and persist the empty cache.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock();
        let removed = state.entries.len();
        state.entries.clear();
        info!(removed, path = %self.config.path.display(), "cleared commit cache");
        self.persist(&state)
    }

    // ------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // A panic mid-update cannot leave the map structurally invalid.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        self.config.max_age_days > 0
            && now - entry.created_at > TimeDelta::days(i64::from(self.config.max_age_days))
    }

    fn evict_locked(&self, state: &mut CacheState, now: DateTime<Utc>) -> usize {
        let before = state.entries.len();

        if self.config.max_age_days > 0 {
            state.entries.retain(|_, entry| !self.is_expired(entry, now));
        }

        let max = self.config.max_entries;
        if max > 0 && state.entries.len() > max {
            let mut by_access: Vec<(DateTime<Utc>, Fingerprint)> = state
                .entries
                .values()
                .map(|e| (e.last_accessed_at, e.fingerprint.clone()))
                .collect();
            by_access.sort();
            let excess = state.entries.len() - max;
            for (_, fp) in by_access.into_iter().take(excess) {
                state.entries.remove(&fp);
            }
        }

        state.last_cleanup = Some(now);
        before - state.entries.len()
    }

    /// Sweep on open when the cleanup interval has elapsed.
    fn sweep_if_due(&self, now: DateTime<Utc>) {
        if !self.config.enabled {
            return;
        }
        let interval = TimeDelta::hours(i64::from(self.config.cleanup_interval_hours));
        let due = {
            let state = self.lock();
            state.last_cleanup.is_none_or(|last| now - last >= interval)
        };
        if !due {
            return;
        }
        match self.evict_at(now) {
            Ok(0) => {}
            Ok(evicted) => info!(evicted, "swept stale cache entries"),
            Err(e) => {
                warn!(error = %e, "failed to persist cache sweep");
                metrics::counter!(telemetry::PERSIST_FAILURES_TOTAL, "store" => "cache")
                    .increment(1);
            }
        }
    }

    fn persist(&self, state: &CacheState) -> Result<()> {
        let file = CacheFileRef {
            version: CACHE_FILE_VERSION,
            config: &self.config,
            last_cleanup: state.last_cleanup,
            entries: state.entries.iter().collect(),
        };
        persist::save_json(&self.config.path, &file)
    }
}

impl std::fmt::Debug for CommitCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitCache")
            .field("config", &self.config)
            .field("entries", &self.len())
            .finish()
    }
}
