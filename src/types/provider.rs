//! Provider identifiers

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies the LLM backend that authored (or failed to author) a message.
///
/// The known backends have dedicated variants; anything else (self-hosted
/// gateways, test fakes) is carried verbatim in [`ProviderId::Other`].
/// Serialized as its display name so it can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderId {
    OpenAi,
    Claude,
    Gemini,
    Grok,
    Groq,
    Ollama,
    Other(String),
}

impl ProviderId {
    /// All first-class providers, in display order.
    pub fn supported() -> [ProviderId; 6] {
        [
            ProviderId::OpenAi,
            ProviderId::Claude,
            ProviderId::Gemini,
            ProviderId::Grok,
            ProviderId::Groq,
            ProviderId::Ollama,
        ]
    }

    /// Whether this is one of the first-class providers.
    pub fn is_supported(&self) -> bool {
        !matches!(self, ProviderId::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProviderId::OpenAi => "OpenAI",
            ProviderId::Claude => "Claude",
            ProviderId::Gemini => "Gemini",
            ProviderId::Grok => "Grok",
            ProviderId::Groq => "Groq",
            ProviderId::Ollama => "Ollama",
            ProviderId::Other(name) => name,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = Infallible;

    /// Known names match case-insensitively; anything else becomes `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let known = ProviderId::supported()
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s));
        Ok(known.unwrap_or_else(|| ProviderId::Other(s.to_string())))
    }
}

impl From<String> for ProviderId {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        ProviderId::from(s.to_string())
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        match id {
            ProviderId::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}
