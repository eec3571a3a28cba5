//! Skald - cached, rate-limited commit message generation
//!
//! This crate sits between a caller that wants a commit message for a set
//! of staged changes and the LLM providers that can write one. It adds a
//! durable content-addressed cache, a persistent usage ledger and a global
//! concurrency ceiling on provider calls. Providers plug in through the
//! [`CommitProvider`] trait.
//!
//! # Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use skald::{CommitProvider, Generation, GenerationOptions, ProviderId, Skald};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl CommitProvider for Echo {
//!     fn name(&self) -> ProviderId {
//!         ProviderId::Other("echo".into())
//!     }
//!
//!     async fn generate(
//!         &self,
//!         changes: &str,
//!         _options: &GenerationOptions,
//!     ) -> skald::Result<Generation> {
//!         Ok(Generation::new(format!("chore: update {} lines", changes.lines().count())))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> skald::Result<()> {
//!     let generator = Skald::builder().max_concurrent(3).build()?;
//!
//!     let options = GenerationOptions::new().style_instruction("conventional commits");
//!     let message = generator
//!         .generate_message(&Echo, "diff --git a/x b/x\n+hello\n", &options)
//!         .await?;
//!
//!     println!("{message}");
//!     println!("success rate: {:.1}%", generator.overall_success_rate());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod limiter;
mod persist;
pub mod providers;
pub mod stats;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use error::{Result, SkaldError};
pub use generator::{Generator, Skald, SkaldBuilder};
pub use providers::CommitProvider;

pub use cache::{CacheConfig, CacheEntry, CacheStats, CommitCache, Fingerprint};
pub use config::Config;
pub use limiter::{LimitsConfig, RateLimiter, SlotGuard};
pub use stats::{ProviderStats, StatsConfig, StatsLedger, UsageStats};

// Re-export all types
pub use types::{Generation, GenerationEvent, GenerationOptions, ProviderId, TokenUsage};

// Callers need the token type for `generate_message_with_cancel`.
pub use tokio_util::sync::CancellationToken;
