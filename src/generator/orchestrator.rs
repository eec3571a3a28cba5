//! Generator - the single entry point for producing commit messages.
//!
//! # Invocation Flow
//!
//! ```text
//! generate_message(provider, changes, options)
//!         │
//!         ▼
//!   fingerprint(changes, provider, style, attempt)
//!         │
//!         ▼
//!   cache lookup ── hit ──► record hit ──► return cached message   [Hit]
//!         │ miss
//!         ▼
//!   acquire slot ── cancelled ──► RateLimitAborted (nothing recorded)
//!         │
//!         ▼
//!   provider.generate ── error/cancel ──► record failure ──► Err  [GeneratedError]
//!         │ ok
//!         ▼
//!   cache store ──► record success ──► release slot ──► Ok       [GeneratedOK]
//! ```
//!
//! Everything after the provider returns is synchronous, so once a result
//! exists the store and the record both happen even if the caller cancels.
//! Persistence failures are logged and counted but never turn a produced
//! message into an error.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::cache::{CacheEntry, CacheStats, CommitCache, Fingerprint};
use crate::limiter::RateLimiter;
use crate::providers::CommitProvider;
use crate::stats::{StatsLedger, UsageStats};
use crate::telemetry;
use crate::types::{Generation, GenerationEvent, GenerationOptions, ProviderId};
use crate::{Result, SkaldError};

/// Cached, rate-limited, stats-recording commit message generator.
///
/// Owns the cache, the ledger and the limiter; providers are owned by the
/// caller and passed per call. Share across tasks behind an `Arc`.
#[derive(Debug)]
pub struct Generator {
    cache: CommitCache,
    ledger: StatsLedger,
    limiter: RateLimiter,
}

impl Generator {
    pub(crate) fn new(cache: CommitCache, ledger: StatsLedger, limiter: RateLimiter) -> Self {
        Self {
            cache,
            ledger,
            limiter,
        }
    }

    /// Produce a commit message for `changes` using `provider`.
    ///
    /// Equivalent to [`generate_message_with_cancel`](Self::generate_message_with_cancel)
    /// with a token that is never cancelled.
    pub async fn generate_message(
        &self,
        provider: &dyn CommitProvider,
        changes: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        self.generate_message_with_cancel(provider, changes, options, &CancellationToken::new())
            .await
    }

    /// Produce a commit message, aborting promptly when `cancel` fires.
    ///
    /// # Errors
    ///
    /// - [`SkaldError::NoChanges`] for blank `changes`; nothing is recorded.
    /// - [`SkaldError::RateLimitAborted`] if cancelled while waiting for a
    ///   slot; nothing is recorded.
    /// - [`SkaldError::Cancelled`] if cancelled during the provider call;
    ///   recorded as a failed generation.
    /// - Any provider error, or [`SkaldError::EmptyResponse`]; recorded as a
    ///   failed generation and returned unchanged.
    #[instrument(skip_all, fields(provider = %provider.name(), attempt = options.attempt))]
    pub async fn generate_message_with_cancel(
        &self,
        provider: &dyn CommitProvider,
        changes: &str,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if changes.trim().is_empty() {
            return Err(SkaldError::NoChanges);
        }

        let provider_id = provider.name();
        let label = provider_id.to_string();
        let fingerprint = Fingerprint::for_request(changes, &provider_id, options);
        let cache_checked = self.cache.is_enabled();

        if let Some(entry) = self.cache.lookup(&fingerprint) {
            debug!(%fingerprint, access_count = entry.access_count, "cache hit");
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "provider" => label).increment(1);
            self.record(GenerationEvent::cache_hit(provider_id));
            return Ok(entry.message);
        }
        if cache_checked {
            debug!(%fingerprint, "cache miss");
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "provider" => label.clone())
                .increment(1);
        }

        // Held until return: the slot covers the bookkeeping too.
        let _slot = self.limiter.acquire(cancel).await?;

        let start = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SkaldError::Cancelled),
            result = provider.generate(changes, options) => {
                result.and_then(|generation| non_empty(generation, &provider_id))
            }
        };
        let elapsed = start.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        metrics::histogram!(telemetry::GENERATION_DURATION_SECONDS, "provider" => label.clone())
            .record(elapsed.as_secs_f64());

        match outcome {
            Ok(generation) => {
                metrics::counter!(telemetry::GENERATIONS_TOTAL, "provider" => label.clone(), "status" => "ok")
                    .increment(1);
                metrics::counter!(telemetry::TOKENS_TOTAL, "provider" => label)
                    .increment(generation.total_tokens());

                let entry =
                    CacheEntry::new(fingerprint, provider_id.clone(), options, &generation);
                if let Err(e) = self.cache.store(entry) {
                    warn!(error = %e, "failed to persist commit cache");
                    metrics::counter!(telemetry::PERSIST_FAILURES_TOTAL, "store" => "cache")
                        .increment(1);
                }
                self.record(
                    GenerationEvent::success(provider_id, elapsed_ms)
                        .tokens(generation.total_tokens())
                        .cost(generation.cost.unwrap_or(0.0))
                        .cache_checked(cache_checked),
                );
                Ok(generation.message)
            }
            Err(err) => {
                metrics::counter!(telemetry::GENERATIONS_TOTAL, "provider" => label, "status" => "error")
                    .increment(1);
                debug!(error = %err, elapsed_ms, "generation failed");
                self.record(
                    GenerationEvent::failure(provider_id, elapsed_ms, &err)
                        .cache_checked(cache_checked),
                );
                Err(err)
            }
        }
    }

    // ===== Query surface =====

    /// Deep copy of the usage ledger.
    pub fn usage_stats(&self) -> UsageStats {
        self.ledger.snapshot()
    }

    /// Aggregates over the current cache entries.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Providers ordered by descending use count.
    pub fn provider_ranking(&self) -> Vec<ProviderId> {
        self.ledger.provider_ranking()
    }

    pub fn most_used_provider(&self) -> Option<(ProviderId, u64)> {
        self.ledger.most_used_provider()
    }

    /// Overall success rate, as a percentage.
    pub fn overall_success_rate(&self) -> f64 {
        self.ledger.overall_success_rate()
    }

    /// Ledger cache hit rate, as a percentage.
    pub fn cache_hit_rate(&self) -> f64 {
        self.ledger.cache_hit_rate()
    }

    /// Zero the usage ledger.
    pub fn reset_stats(&self) -> Result<()> {
        self.ledger.reset()
    }

    /// Drop every cached message.
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    /// Run cache eviction now. Returns the number of entries removed.
    pub fn evict_cache(&self) -> Result<usize> {
        self.cache.evict()
    }

    /// The concurrency ceiling for provider calls.
    pub fn max_concurrent(&self) -> usize {
        self.limiter.max_concurrent()
    }

    /// Provider calls currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.limiter.in_flight()
    }

    fn record(&self, event: GenerationEvent) {
        if let Err(e) = self.ledger.record(event) {
            warn!(error = %e, "failed to persist usage stats");
            metrics::counter!(telemetry::PERSIST_FAILURES_TOTAL, "store" => "stats").increment(1);
        }
    }
}

/// Reject blank provider output; trim what remains.
fn non_empty(mut generation: Generation, provider: &ProviderId) -> Result<Generation> {
    let trimmed = generation.message.trim();
    if trimmed.is_empty() {
        return Err(SkaldError::EmptyResponse {
            provider: provider.clone(),
        });
    }
    if trimmed.len() != generation.message.len() {
        generation.message = trimmed.to_string();
    }
    Ok(generation)
}
