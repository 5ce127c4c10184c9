//! Text-generation provider abstraction.
//!
//! The relay talks to the provider only through [`TextGenerator`], so tests
//! can substitute a double that simulates any failure without network access.
//!
//! # Providers
//!
//! - [`gemini::GeminiClient`] — Google Gemini `generateContent` API

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ApiKey;

/// Errors reported by a text-generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status.
    #[error("provider returned {code}: {message}")]
    Status {
        code: u16,
        /// Provider status string, e.g. `RESOURCE_EXHAUSTED`.
        status: Option<String>,
        /// Machine-readable reason, e.g. `API_KEY_INVALID`.
        reason: Option<String>,
        message: String,
    },

    /// Connect, send, or timeout failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// HTTP status code reported by the provider, if any.
    pub fn code(&self) -> Option<u16> {
        match self {
            ProviderError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            ProviderError::Status { status, .. } => status.as_deref(),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ProviderError::Status { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ProviderError::Status { message, .. } => message,
            ProviderError::Network(m) | ProviderError::Malformed(m) | ProviderError::Other(m) => m,
        }
    }
}

/// A hosted service that turns a system instruction and a prompt into text.
///
/// The credential is handed over on every call so it is always read from the
/// current configuration rather than captured at construction time.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(
        &self,
        credential: &ApiKey,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_expose_structured_fields() {
        let err = ProviderError::Status {
            code: 429,
            status: Some("RESOURCE_EXHAUSTED".into()),
            reason: Some("RATE_LIMIT_EXCEEDED".into()),
            message: "Resource has been exhausted".into(),
        };
        assert_eq!(err.code(), Some(429));
        assert_eq!(err.status(), Some("RESOURCE_EXHAUSTED"));
        assert_eq!(err.reason(), Some("RATE_LIMIT_EXCEEDED"));
        assert_eq!(err.message(), "Resource has been exhausted");
        assert_eq!(err.to_string(), "provider returned 429: Resource has been exhausted");
    }

    #[test]
    fn unstructured_errors_have_no_code() {
        let err = ProviderError::Network("connection refused".into());
        assert_eq!(err.code(), None);
        assert_eq!(err.status(), None);
        assert_eq!(err.message(), "connection refused");
    }
}
