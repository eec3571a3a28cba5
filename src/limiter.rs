//! Concurrency ceiling for outbound generation calls.
//!
//! [`RateLimiter`] wraps a FIFO-fair `tokio::sync::Semaphore`. Every provider
//! call holds one [`SlotGuard`]; the slot is released when the guard drops,
//! so release happens exactly once on every exit path, including errors,
//! panics and cancellation of the holding future.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{Result, SkaldError};

/// Default number of provider calls allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Resource limits. Loadable from the `[limits]` table of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum concurrent provider calls (default: 5). Must be at least 1.
    pub max_concurrent_generations: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_generations: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// Bounds the number of provider calls in flight, across all providers.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    slots: Arc<Semaphore>,
    max_concurrent: usize,
}

/// A held generation slot. Dropping it frees the slot.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the guard is dropped"]
pub struct SlotGuard {
    _permit: OwnedSemaphorePermit,
}

impl RateLimiter {
    /// Create a limiter allowing `max_concurrent` simultaneous holders.
    ///
    /// Returns a configuration error for a ceiling of zero, which could
    /// never be acquired.
    pub fn new(max_concurrent: usize) -> Result<Self> {
        if max_concurrent == 0 {
            return Err(SkaldError::Configuration(
                "max_concurrent_generations must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            slots: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        })
    }

    /// Wait for a free slot.
    ///
    /// Waiters are served in arrival order. Returns
    /// [`SkaldError::RateLimitAborted`] as soon as `cancel` fires, whether
    /// or not a slot was about to free up.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<SlotGuard> {
        if cancel.is_cancelled() {
            return Err(SkaldError::RateLimitAborted);
        }
        let slots = Arc::clone(&self.slots);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("cancelled while waiting for a generation slot");
                Err(SkaldError::RateLimitAborted)
            }
            permit = slots.acquire_owned() => {
                // The semaphore is never closed.
                let permit = permit.map_err(|_| SkaldError::RateLimitAborted)?;
                Ok(SlotGuard { _permit: permit })
            }
        }
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<SlotGuard> {
        Arc::clone(&self.slots)
            .try_acquire_owned()
            .ok()
            .map(|permit| SlotGuard { _permit: permit })
    }

    /// The configured ceiling.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Slots currently held.
    pub fn in_flight(&self) -> usize {
        self.max_concurrent - self.available()
    }
}
