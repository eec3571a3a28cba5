//! Generator implementation

mod builder;
mod orchestrator;

pub use builder::{Skald, SkaldBuilder};
pub use orchestrator::Generator;
