use std::time::Duration;

use skald::{ProviderId, Result, SkaldError};

#[test]
fn test_error_display() {
    let err = SkaldError::provider(ProviderId::Grok, "bad gateway");
    assert_eq!(err.to_string(), "Grok error: bad gateway");

    let err = SkaldError::EmptyResponse {
        provider: ProviderId::OpenAi,
    };
    assert!(err.to_string().contains("OpenAI"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(SkaldError::NoChanges)
    }
    assert!(returns_error().is_err());
}

#[test]
fn json_errors_convert() {
    fn parse() -> Result<serde_json::Value> {
        Ok(serde_json::from_str("{nope")?)
    }
    assert!(matches!(parse(), Err(SkaldError::Json(_))));
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn cancellation_errors() {
    assert!(SkaldError::RateLimitAborted.is_cancellation());
    assert!(SkaldError::Cancelled.is_cancellation());
    assert!(!SkaldError::NoChanges.is_cancellation());
    assert!(!SkaldError::provider(ProviderId::Groq, "x").is_cancellation());
}

#[test]
fn provider_errors() {
    assert!(SkaldError::provider(ProviderId::Groq, "x").is_provider_error());
    assert!(
        SkaldError::AuthenticationFailed {
            provider: ProviderId::Claude
        }
        .is_provider_error()
    );
    assert!(
        SkaldError::RateLimited {
            provider: ProviderId::Gemini,
            retry_after: Some(Duration::from_secs(30)),
        }
        .is_provider_error()
    );
    assert!(
        SkaldError::EmptyResponse {
            provider: ProviderId::Ollama
        }
        .is_provider_error()
    );
}

#[test]
fn local_errors_are_not_provider_errors() {
    assert!(!SkaldError::NoChanges.is_provider_error());
    assert!(!SkaldError::Cancelled.is_provider_error());
    assert!(!SkaldError::Configuration("x".into()).is_provider_error());
    assert!(!SkaldError::Persistence("x".into()).is_provider_error());
}

#[test]
fn custom_providers_display_their_name() {
    let err = SkaldError::AuthenticationFailed {
        provider: ProviderId::from("my-local-llm"),
    };
    assert_eq!(err.to_string(), "my-local-llm authentication failed");
}
