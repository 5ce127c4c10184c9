//! # vital_core
//!
//! Core chat relay logic for Vital: request validation, prompt construction,
//! the provider abstraction and the error taxonomy shared by every front end.

pub mod chat;
pub mod config;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod relay;

pub use chat::{ChatRequest, ChatTurn, Role};
pub use config::{ApiKey, ConfigError, ProviderConfig};
pub use error::{ErrorKind, RelayError};
pub use provider::{ProviderError, TextGenerator};
pub use relay::ChatRelay;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
