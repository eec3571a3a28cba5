//! The provider capability consumed by the generator.
//!
//! Every backend (OpenAI, Gemini, Grok, a local Ollama, a test fake) is a
//! separate type implementing [`CommitProvider`]. Adapters own their
//! transport, authentication and prompt construction; the generator only
//! ever sees this trait and never constructs or authenticates a provider.
//!
//! # Error Semantics
//!
//! Adapters report failures with the provider-class variants of
//! [`SkaldError`](crate::SkaldError) (`Provider`, `AuthenticationFailed`,
//! `RateLimited`). The generator records them as failed generations and
//! propagates them unchanged; it never retries.
//!
//! # Example
//!
//! ```ignore
//! struct Grok { client: HttpClient, key: String }
//!
//! #[async_trait]
//! impl CommitProvider for Grok {
//!     fn name(&self) -> ProviderId {
//!         ProviderId::Grok
//!     }
//!
//!     async fn generate(&self, changes: &str, options: &GenerationOptions) -> Result<Generation> {
//!         let prompt = build_prompt(changes, options.style());
//!         let reply = self.client.complete(&self.key, &prompt).await?;
//!         Ok(Generation::new(reply.text).usage(reply.usage))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::{Generation, GenerationOptions, ProviderId};

/// A backend able to author a commit message from diff text.
#[async_trait]
pub trait CommitProvider: Send + Sync {
    /// Stable identifier, used in cache fingerprints and stats keys.
    fn name(&self) -> ProviderId;

    /// Produce a commit message for `changes`.
    ///
    /// Must be cancel-safe: the generator drops this future when the
    /// caller cancels.
    async fn generate(&self, changes: &str, options: &GenerationOptions) -> Result<Generation>;
}
