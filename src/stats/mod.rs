//! Usage statistics.
//!
//! [`StatsLedger`] is the durable, concurrency-safe store; [`UsageStats`]
//! and [`ProviderStats`] are the plain aggregates it hands out as snapshots.

pub mod ledger;
pub mod usage;

pub use ledger::{StatsConfig, StatsLedger};
pub use usage::{ProviderStats, UsageStats};
