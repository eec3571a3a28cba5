//! Usage aggregates and the arithmetic that maintains them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{GenerationEvent, ProviderId};

/// Durable, process-spanning usage totals.
///
/// Invariant: `successful_generations + failed_generations ==
/// total_generations`, globally and for every entry of `provider_stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageStats {
    pub total_generations: u64,
    pub successful_generations: u64,
    pub failed_generations: u64,
    pub provider_stats: BTreeMap<ProviderId, ProviderStats>,
    pub first_use: Option<DateTime<Utc>>,
    pub last_use: Option<DateTime<Utc>>,
    pub total_cost: f64,
    pub total_tokens_used: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub average_generation_time_ms: f64,
}

/// The same aggregates scoped to one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub name: ProviderId,
    #[serde(default)]
    pub total_uses: u64,
    #[serde(default)]
    pub successful_uses: u64,
    #[serde(default)]
    pub failed_uses: u64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub total_tokens_used: u64,
    #[serde(default)]
    pub average_generation_time_ms: f64,
    #[serde(default)]
    pub first_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
    /// Percentage, refreshed on every record.
    #[serde(default)]
    pub success_rate: f64,
}

impl ProviderStats {
    pub fn new(name: ProviderId) -> Self {
        Self {
            name,
            total_uses: 0,
            successful_uses: 0,
            failed_uses: 0,
            total_cost: 0.0,
            total_tokens_used: 0,
            average_generation_time_ms: 0.0,
            first_used: None,
            last_used: None,
            success_rate: 0.0,
        }
    }

    /// `successful / total × 100`, 0 when unused.
    pub fn success_rate(&self) -> f64 {
        percentage(self.successful_uses, self.total_uses)
    }

    fn apply(&mut self, event: &GenerationEvent) {
        self.total_uses += 1;
        if event.success {
            self.successful_uses += 1;
        } else {
            self.failed_uses += 1;
        }
        self.total_cost += event.cost;
        self.total_tokens_used += event.tokens_used;
        self.first_used.get_or_insert(event.timestamp);
        self.last_used = Some(event.timestamp);
        self.average_generation_time_ms = running_mean(
            self.average_generation_time_ms,
            self.total_uses,
            event.generation_time_ms,
        );
        self.success_rate = self.success_rate();
    }
}

impl UsageStats {
    /// Fold one event into the global and per-provider aggregates.
    pub fn apply(&mut self, event: &GenerationEvent) {
        self.total_generations += 1;
        if event.success {
            self.successful_generations += 1;
        } else {
            self.failed_generations += 1;
        }
        self.total_cost += event.cost;
        self.total_tokens_used += event.tokens_used;
        self.first_use.get_or_insert(event.timestamp);
        self.last_use = Some(event.timestamp);

        // Only count lookups that actually happened.
        if event.cache_checked {
            if event.cache_hit {
                self.cache_hits += 1;
            } else {
                self.cache_misses += 1;
            }
        }

        self.average_generation_time_ms = running_mean(
            self.average_generation_time_ms,
            self.total_generations,
            event.generation_time_ms,
        );

        self.provider_stats
            .entry(event.provider.clone())
            .or_insert_with(|| ProviderStats::new(event.provider.clone()))
            .apply(event);
    }

    /// Successful generations as a percentage of all generations.
    pub fn success_rate(&self) -> f64 {
        percentage(self.successful_generations, self.total_generations)
    }

    /// Failed generations as a percentage of all generations.
    pub fn failure_rate(&self) -> f64 {
        percentage(self.failed_generations, self.total_generations)
    }

    /// Cache hits as a percentage of cache lookups.
    pub fn cache_hit_rate(&self) -> f64 {
        percentage(self.cache_hits, self.cache_hits + self.cache_misses)
    }

    /// The provider with the most uses, or `None` before any use.
    ///
    /// Ties go to the provider that sorts first; callers should not rely on
    /// which one that is.
    pub fn most_used_provider(&self) -> Option<(ProviderId, u64)> {
        self.provider_stats
            .values()
            .fold(None, |best: Option<&ProviderStats>, p| match best {
                Some(b) if b.total_uses >= p.total_uses => Some(b),
                _ => Some(p),
            })
            .map(|p| (p.name.clone(), p.total_uses))
    }

    /// Providers ordered by descending use count.
    pub fn provider_ranking(&self) -> Vec<ProviderId> {
        let mut ranked: Vec<&ProviderStats> = self.provider_stats.values().collect();
        ranked.sort_by(|a, b| b.total_uses.cmp(&a.total_uses));
        ranked.into_iter().map(|p| p.name.clone()).collect()
    }
}

/// Incremental mean: the `n`th sample folded into the mean of the first `n - 1`.
fn running_mean(mean: f64, n: u64, sample: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    (mean * (n - 1.0) + sample) / n
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
