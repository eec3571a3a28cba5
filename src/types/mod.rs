//! Public types for the Skald API.

mod event;
mod generate;
mod provider;

pub use event::GenerationEvent;
pub use generate::{Generation, GenerationOptions, TokenUsage};
pub use provider::ProviderId;
