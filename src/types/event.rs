//! The per-invocation record handed to the stats ledger.

use chrono::{DateTime, Utc};

use super::ProviderId;

/// Outcome of one orchestrator invocation.
///
/// Built by the generator, consumed once by
/// [`StatsLedger::record`](crate::stats::StatsLedger::record), never persisted
/// on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationEvent {
    pub provider: ProviderId,
    pub success: bool,
    /// Wall-clock time spent in the provider call, in milliseconds.
    pub generation_time_ms: f64,
    pub tokens_used: u64,
    pub cost: f64,
    /// Whether the cache was consulted at all (false when caching is disabled).
    pub cache_checked: bool,
    pub cache_hit: bool,
    pub timestamp: DateTime<Utc>,
    pub error_message: Option<String>,
}

impl GenerationEvent {
    /// A successful provider call (or a cache hit, see [`Self::cache_hit`]).
    pub fn success(provider: ProviderId, generation_time_ms: f64) -> Self {
        Self {
            provider,
            success: true,
            generation_time_ms,
            tokens_used: 0,
            cost: 0.0,
            cache_checked: false,
            cache_hit: false,
            timestamp: Utc::now(),
            error_message: None,
        }
    }

    /// A failed provider call.
    pub fn failure(provider: ProviderId, generation_time_ms: f64, error: impl ToString) -> Self {
        Self {
            success: false,
            error_message: Some(error.to_string()),
            ..Self::success(provider, generation_time_ms)
        }
    }

    /// A request satisfied from the cache: no time, tokens or cost spent.
    pub fn cache_hit(provider: ProviderId) -> Self {
        Self {
            cache_checked: true,
            cache_hit: true,
            ..Self::success(provider, 0.0)
        }
    }

    /// Set tokens used.
    pub fn tokens(mut self, tokens: u64) -> Self {
        self.tokens_used = tokens;
        self
    }

    /// Set cost.
    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Mark that the cache was consulted (and missed) before this call.
    pub fn cache_checked(mut self, checked: bool) -> Self {
        self.cache_checked = checked;
        self
    }
}
