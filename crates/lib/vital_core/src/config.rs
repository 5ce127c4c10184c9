//! Provider configuration.
//!
//! Resolved once from environment variables and then injected into the relay;
//! nothing in the request path reads the process environment directly.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::prompt::{DEFAULT_GREETING, DEFAULT_SYSTEM_INSTRUCTION};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },

    #[error("Cannot read system instruction from {path}: {source}")]
    SystemInstruction {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Provider credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key; blank strings count as no key.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Everything the relay needs to reach the provider.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// `None` makes every chat request fail with a configuration error.
    pub api_key: Option<ApiKey>,
    pub model: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Upper bound on one provider call.
    pub timeout: Duration,
    pub system_instruction: String,
    /// Canned assistant greeting the widget shows first; filtered from history.
    pub greeting: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                        | Default                                     |
    /// |---------------------------------|---------------------------------------------|
    /// | `GEMINI_API_KEY`                | unset                                       |
    /// | `GEMINI_MODEL`                  | `gemini-2.0-flash`                          |
    /// | `GEMINI_BASE_URL`               | `https://generativelanguage.googleapis.com` |
    /// | `GEMINI_TIMEOUT_SECS`           | `30`                                        |
    /// | `VITAL_SYSTEM_INSTRUCTION_FILE` | built-in health policy                      |
    /// | `VITAL_GREETING`                | built-in greeting                           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            api_key: lookup("GEMINI_API_KEY").and_then(ApiKey::new),
            ..Self::default()
        };

        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }

        if let Some(raw) = lookup("GEMINI_BASE_URL").filter(|u| !u.trim().is_empty()) {
            let parsed = Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid {
                var: "GEMINI_BASE_URL",
                value: raw.clone(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid {
                    var: "GEMINI_BASE_URL",
                    value: raw,
                });
            }
            config.base_url = parsed.as_str().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("GEMINI_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid {
                    var: "GEMINI_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(path) =
            lookup("VITAL_SYSTEM_INSTRUCTION_FILE").filter(|p| !p.trim().is_empty())
        {
            let path = PathBuf::from(path.trim());
            let text = std::fs::read_to_string(&path).map_err(|source| {
                ConfigError::SystemInstruction {
                    path: path.clone(),
                    source,
                }
            })?;
            if text.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    var: "VITAL_SYSTEM_INSTRUCTION_FILE",
                    value: path.display().to_string(),
                });
            }
            config.system_instruction = text;
        }

        if let Some(greeting) = lookup("VITAL_GREETING").filter(|g| !g.is_empty()) {
            config.greeting = greeting;
        }

        Ok(config)
    }

    /// Builder-style helper for tests and embedders.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = ApiKey::new(key);
        self
    }
}
