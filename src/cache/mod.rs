//! Caching subsystem.
//!
//! - [`Fingerprint`]: stable SHA-256 key over (changes, provider, style,
//!   attempt).
//! - [`CommitCache`]: durable fingerprint → message store with age and
//!   capacity eviction. See [`message`] module docs for storage and
//!   locking notes.

pub mod fingerprint;
pub mod message;

pub use fingerprint::Fingerprint;
pub use message::{CacheConfig, CacheEntry, CacheStats, CommitCache};
