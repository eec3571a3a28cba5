//! Telemetry metric name constants.
//!
//! Centralised metric names for skald operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `skald_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "OpenAI", "Grok")
//! - `status`: outcome: "ok" or "error"
//! - `store`: persisted store: "cache" or "stats"

/// Total provider calls made by the generator (cache hits excluded).
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const GENERATIONS_TOTAL: &str = "skald_generations_total";

/// Provider call duration in seconds.
///
/// Labels: `provider`.
pub const GENERATION_DURATION_SECONDS: &str = "skald_generation_duration_seconds";

/// Total tokens reported by providers.
///
/// Labels: `provider`.
pub const TOKENS_TOTAL: &str = "skald_tokens_total";

/// Total cache hits.
///
/// Labels: `provider`.
pub const CACHE_HITS_TOTAL: &str = "skald_cache_hits_total";

/// Total cache misses.
///
/// Labels: `provider`.
pub const CACHE_MISSES_TOTAL: &str = "skald_cache_misses_total";

/// Total failed writes of a persisted store. The in-memory state stays
/// authoritative when this increments.
///
/// Labels: `store` ("cache" | "stats").
pub const PERSIST_FAILURES_TOTAL: &str = "skald_persist_failures_total";
