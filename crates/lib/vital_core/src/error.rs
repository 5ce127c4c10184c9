//! Relay error taxonomy.
//!
//! Every failure the relay can produce maps to exactly one [`ErrorKind`], one
//! HTTP status, and one caller-facing message. Provider detail stays in the
//! `Display` output for server-side logs and never reaches the caller.

use http::StatusCode;
use thiserror::Error;

use crate::provider::ProviderError;

const MISSING_CREDENTIAL: &str =
    "API configuration error. Please set GEMINI_API_KEY environment variable.";
const CREDENTIAL_REJECTED: &str = "API configuration error. Please set up your GEMINI_API_KEY.";
const QUOTA_EXCEEDED: &str =
    "Service temporarily unavailable due to high demand. Please try again in a few minutes.";
const NETWORK: &str = "Network connection issue. Please check your internet and try again.";
const ACCESS_DENIED: &str = "API access denied. Please check your API key permissions.";
const PROVIDER_BAD_REQUEST: &str = "Invalid request. Please try rephrasing your question.";
const GENERIC: &str = "Unable to process your request right now. Please try again later.";

/// Caller-facing classification of a relay failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    ConfigurationError,
    QuotaExceeded,
    NetworkError,
    AccessDenied,
    ProviderBadRequest,
    EmptyResponseError,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::ConfigurationError => "configuration_error",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::ProviderBadRequest => "provider_bad_request",
            ErrorKind::EmptyResponseError => "empty_response",
            ErrorKind::UnknownError => "unknown_error",
        }
    }
}

/// Errors produced while relaying one chat request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound request was unusable; carries the caller-facing message.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider credential is not configured")]
    MissingCredential,

    #[error("Provider rejected the credential: {0}")]
    CredentialRejected(ProviderError),

    #[error("Provider quota exceeded: {0}")]
    QuotaExceeded(ProviderError),

    #[error("Provider unreachable: {0}")]
    Network(ProviderError),

    #[error("Provider denied access: {0}")]
    AccessDenied(ProviderError),

    #[error("Provider rejected the prompt: {0}")]
    ProviderBadRequest(ProviderError),

    #[error("Empty response from AI model")]
    EmptyResponse,

    #[error("Unexpected provider failure: {0}")]
    Unknown(ProviderError),
}

impl RelayError {
    /// Classify a provider failure.
    ///
    /// Rules are tried in order: credential, quota, network, access, bad
    /// request. Message text is only consulted when the provider returned no
    /// HTTP status, so a structured status always wins over wording.
    pub fn from_provider(err: ProviderError) -> Self {
        if is_credential_fault(&err) {
            RelayError::CredentialRejected(err)
        } else if is_quota_fault(&err) {
            RelayError::QuotaExceeded(err)
        } else if is_network_fault(&err) {
            RelayError::Network(err)
        } else if err.code() == Some(403) || err.status() == Some("PERMISSION_DENIED") {
            RelayError::AccessDenied(err)
        } else if err.code() == Some(400) || err.status() == Some("INVALID_ARGUMENT") {
            RelayError::ProviderBadRequest(err)
        } else {
            RelayError::Unknown(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            RelayError::MissingCredential | RelayError::CredentialRejected(_) => {
                ErrorKind::ConfigurationError
            }
            RelayError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            RelayError::Network(_) => ErrorKind::NetworkError,
            RelayError::AccessDenied(_) => ErrorKind::AccessDenied,
            RelayError::ProviderBadRequest(_) => ErrorKind::ProviderBadRequest,
            RelayError::EmptyResponse => ErrorKind::EmptyResponseError,
            RelayError::Unknown(_) => ErrorKind::UnknownError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidRequest | ErrorKind::ProviderBadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::NetworkError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::AccessDenied => StatusCode::FORBIDDEN,
            ErrorKind::ConfigurationError
            | ErrorKind::EmptyResponseError
            | ErrorKind::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the end user.
    pub fn public_message(&self) -> &str {
        match self {
            RelayError::InvalidRequest(m) => m.as_str(),
            RelayError::MissingCredential => MISSING_CREDENTIAL,
            RelayError::CredentialRejected(_) => CREDENTIAL_REJECTED,
            RelayError::QuotaExceeded(_) => QUOTA_EXCEEDED,
            RelayError::Network(_) => NETWORK,
            RelayError::AccessDenied(_) => ACCESS_DENIED,
            RelayError::ProviderBadRequest(_) => PROVIDER_BAD_REQUEST,
            RelayError::EmptyResponse | RelayError::Unknown(_) => GENERIC,
        }
    }

    /// Whether resending the same request later may succeed.
    ///
    /// The relay never retries on its own; this is advice for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::QuotaExceeded
                | ErrorKind::NetworkError
                | ErrorKind::EmptyResponseError
                | ErrorKind::UnknownError
        )
    }

    /// The underlying provider failure, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            RelayError::CredentialRejected(e)
            | RelayError::QuotaExceeded(e)
            | RelayError::Network(e)
            | RelayError::AccessDenied(e)
            | RelayError::ProviderBadRequest(e)
            | RelayError::Unknown(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(e: ProviderError) -> Self {
        RelayError::from_provider(e)
    }
}

fn mentions(err: &ProviderError, needles: &[&str]) -> bool {
    if err.code().is_some() {
        return false;
    }
    let message = err.message().to_ascii_lowercase();
    needles.iter().any(|n| message.contains(n))
}

fn is_credential_fault(err: &ProviderError) -> bool {
    err.code() == Some(401)
        || err.status() == Some("UNAUTHENTICATED")
        || err.reason().is_some_and(|r| r.starts_with("API_KEY"))
        || mentions(err, &["api_key", "authentication"])
}

fn is_quota_fault(err: &ProviderError) -> bool {
    err.code() == Some(429)
        || err.status() == Some("RESOURCE_EXHAUSTED")
        || mentions(err, &["quota", "limit"])
}

fn is_network_fault(err: &ProviderError) -> bool {
    matches!(err, ProviderError::Network(_)) || mentions(err, &["network", "fetch"])
}
