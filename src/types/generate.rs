//! Types for commit message generation.

use serde::{Deserialize, Serialize};

/// Per-request options passed through to the provider.
///
/// Both fields take part in the cache fingerprint, so changing either one
/// produces a distinct cache slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Free-form style guidance appended to the prompt (e.g. "use gitmoji").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_instruction: Option<String>,

    /// Regeneration counter. Callers bump it to ask for a fresh variant of
    /// an already cached message.
    #[serde(default)]
    pub attempt: u32,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set style instruction.
    pub fn style_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.style_instruction = Some(instruction.into());
        self
    }

    /// Set attempt index.
    pub fn attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    /// The style instruction for prompt building, with blank strings
    /// treated as absent. Cache keys use `style_instruction` verbatim.
    pub fn style(&self) -> Option<&str> {
        self.style_instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A provider's answer: the message plus whatever accounting it reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Monetary cost of the call in USD, when the provider can price it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl Generation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            usage: None,
            cost: None,
        }
    }

    /// Set token usage.
    pub fn usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Set cost.
    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub(crate) fn total_tokens(&self) -> u64 {
        self.usage.map_or(0, |u| u64::from(u.total_tokens))
    }
}

impl From<String> for Generation {
    fn from(message: String) -> Self {
        Generation::new(message)
    }
}

impl From<&str> for Generation {
    fn from(message: &str) -> Self {
        Generation::new(message)
    }
}
