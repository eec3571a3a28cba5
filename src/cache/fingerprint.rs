//! Content-addressed cache keys.
//!
//! A [`Fingerprint`] is the SHA-256 of (changes, provider, style instruction,
//! attempt). Each text field is length-prefixed before hashing so that
//! moving bytes between adjacent fields can never produce the same input
//! stream. The encoding is fixed (little-endian lengths, UTF-8 bytes), so a
//! fingerprint computed today matches one persisted by an earlier process
//! on any platform.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{GenerationOptions, ProviderId};

/// Hex-encoded SHA-256 cache key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the key for a generation request.
    ///
    /// An absent style instruction hashes the same as an empty one.
    pub fn compute(
        changes: &str,
        provider: &ProviderId,
        style_instruction: Option<&str>,
        attempt: u32,
    ) -> Self {
        let mut hasher = Sha256::new();
        for field in [changes, provider.as_str(), style_instruction.unwrap_or("")] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.update(attempt.to_le_bytes());
        Fingerprint(format!("{:x}", hasher.finalize()))
    }

    /// Compute the key for `changes` sent to `provider` with `options`.
    ///
    /// The style instruction is hashed exactly as given, whitespace included.
    pub fn for_request(changes: &str, provider: &ProviderId, options: &GenerationOptions) -> Self {
        Self::compute(
            changes,
            provider,
            options.style_instruction.as_deref(),
            options.attempt,
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: &str = "diff --git a/x b/x\n+hello\n";

    #[test]
    fn deterministic() {
        let a = Fingerprint::compute(DIFF, &ProviderId::Grok, Some("terse"), 2);
        let b = Fingerprint::compute(DIFF, &ProviderId::Grok, Some("terse"), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn stable_across_processes() {
        // Pinned digests: a change here invalidates every persisted cache.
        assert_eq!(
            Fingerprint::compute(DIFF, &ProviderId::Grok, None, 0).as_str(),
            "73c29bcc51e71351669222c6e107479447eaea8a9a43514c8bd70f868c589c3e"
        );
        assert_eq!(
            Fingerprint::compute("", &ProviderId::OpenAi, None, 0).as_str(),
            "cc0ed130aa76d38afe3199a9f0c86ce16f77ed52542dbb257d8c110a9a48547e"
        );
    }

    #[test]
    fn differs_on_each_input() {
        let base = Fingerprint::compute(DIFF, &ProviderId::Grok, Some("terse"), 0);
        assert_ne!(
            base,
            Fingerprint::compute("other diff", &ProviderId::Grok, Some("terse"), 0)
        );
        assert_ne!(
            base,
            Fingerprint::compute(DIFF, &ProviderId::Gemini, Some("terse"), 0)
        );
        assert_ne!(
            base,
            Fingerprint::compute(DIFF, &ProviderId::Grok, Some("verbose"), 0)
        );
        assert_ne!(
            base,
            Fingerprint::compute(DIFF, &ProviderId::Grok, Some("terse"), 1)
        );
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        let a = Fingerprint::compute("ab", &ProviderId::from("c"), None, 0);
        let b = Fingerprint::compute("a", &ProviderId::from("bc"), None, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn whitespace_styles_are_distinct_inputs() {
        let key = |options: GenerationOptions| {
            Fingerprint::for_request(DIFF, &ProviderId::Grok, &options)
        };
        let none = key(GenerationOptions::new());
        let spaces = key(GenerationOptions::new().style_instruction("  "));
        let tab = key(GenerationOptions::new().style_instruction("\t"));

        assert_ne!(none, spaces);
        assert_ne!(none, tab);
        assert_ne!(spaces, tab);
        // Absent hashes as the empty string.
        assert_eq!(none, key(GenerationOptions::new().style_instruction("")));
    }

    #[test]
    fn is_hex_sha256() {
        let fp = Fingerprint::compute(DIFF, &ProviderId::Claude, None, 0);
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
