//! The chat relay: one inbound request, one provider call, one reply.
//!
//! Per request the relay validates input, checks the credential, builds the
//! prompt, awaits the provider once and either returns non-empty text or a
//! classified [`RelayError`]. It keeps no state between requests.

use std::sync::Arc;

use chrono::Utc;
use tracing::{Level, error, info, warn};

use crate::chat::ChatRequest;
use crate::config::ProviderConfig;
use crate::error::RelayError;
use crate::prompt::build_prompt;
use crate::provider::TextGenerator;

/// Relays chat requests to a [`TextGenerator`].
pub struct ChatRelay {
    config: ProviderConfig,
    generator: Arc<dyn TextGenerator>,
}

impl ChatRelay {
    pub fn new(config: ProviderConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self { config, generator }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Whether a provider credential is present.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Parse a raw JSON body and relay it.
    pub async fn relay_json(&self, body: &[u8]) -> Result<String, RelayError> {
        match ChatRequest::from_json(body) {
            Ok(request) => self.relay(&request).await,
            Err(e) => {
                log_failure(&e);
                Err(e)
            }
        }
    }

    /// Relay an already validated request.
    pub async fn relay(&self, request: &ChatRequest) -> Result<String, RelayError> {
        let result = self.generate(request).await;
        match &result {
            Ok(text) => info!(reply_chars = text.len(), "generated chat response"),
            Err(e) => log_failure(e),
        }
        result
    }

    async fn generate(&self, request: &ChatRequest) -> Result<String, RelayError> {
        let Some(credential) = self.config.api_key.as_ref() else {
            error!("GEMINI_API_KEY is not configured; refusing chat request");
            return Err(RelayError::MissingCredential);
        };

        let prompt = build_prompt(request, &self.config.greeting);

        let text = self
            .generator
            .generate_text(credential, &self.config.system_instruction, &prompt)
            .await?;

        if text.trim().is_empty() {
            return Err(RelayError::EmptyResponse);
        }

        Ok(text)
    }
}

/// Caller mistakes are warnings; provider and configuration faults are errors.
fn failure_level(err: &RelayError) -> Level {
    if err.status().is_client_error() {
        Level::WARN
    } else {
        Level::ERROR
    }
}

fn log_failure(err: &RelayError) {
    let provider = err.provider_error();
    let code = provider.and_then(|p| p.code());
    let provider_status = provider.and_then(|p| p.status());
    let reason = provider.and_then(|p| p.reason());
    let timestamp = Utc::now().to_rfc3339();

    // `event!` needs a constant level.
    if failure_level(err) == Level::WARN {
        warn!(
            kind = err.kind().as_str(),
            status = err.status().as_u16(),
            provider_code = code,
            provider_status,
            provider_reason = reason,
            %timestamp,
            error = %err,
            "chat request rejected"
        );
    } else {
        error!(
            kind = err.kind().as_str(),
            status = err.status().as_u16(),
            provider_code = code,
            provider_status,
            provider_reason = reason,
            %timestamp,
            error = %err,
            "chat relay failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::chat::ChatTurn;
    use crate::config::ApiKey;
    use crate::error::ErrorKind;
    use crate::prompt::DEFAULT_GREETING;
    use crate::provider::ProviderError;

    /// Test double that replays a fixed outcome and records every call.
    struct ScriptedGenerator {
        outcome: fn() -> Result<String, ProviderError>,
        calls: AtomicU32,
        prompts: Mutex<Vec<String>>,
        instructions: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(outcome: fn() -> Result<String, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicU32::new(0),
                prompts: Mutex::new(Vec::new()),
                instructions: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate_text(
            &self,
            _credential: &ApiKey,
            system_instruction: &str,
            prompt: &str,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.instructions
                .lock()
                .unwrap()
                .push(system_instruction.to_string());
            (self.outcome)()
        }
    }

    fn configured() -> ProviderConfig {
        ProviderConfig::default().with_api_key("test-key")
    }

    fn relay_with(config: ProviderConfig, generator: Arc<ScriptedGenerator>) -> ChatRelay {
        ChatRelay::new(config, generator)
    }

    #[tokio::test]
    async fn returns_provider_text() {
        let generator = ScriptedGenerator::new(|| Ok("Hello".into()));
        let relay = relay_with(configured(), generator.clone());

        let text = relay.relay_json(br#"{"message":"hi"}"#).await.unwrap();
        assert_eq!(text, "Hello");
        assert_eq!(generator.calls(), 1);
        assert_eq!(generator.prompts.lock().unwrap()[0], "hi");
    }

    #[tokio::test]
    async fn invalid_message_never_reaches_provider() {
        let generator = ScriptedGenerator::new(|| Ok("unused".into()));
        let relay = relay_with(configured(), generator.clone());

        let bodies: [&[u8]; 3] = [br#"{}"#, br#"{"message":""}"#, br#"{"message":"   "}"#];
        for body in bodies {
            let err = relay.relay_json(body).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRequest);
            assert_eq!(err.status().as_u16(), 400);
        }
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn missing_credential_never_reaches_provider() {
        let generator = ScriptedGenerator::new(|| Ok("unused".into()));
        let relay = relay_with(ProviderConfig::default(), generator.clone());

        let err = relay.relay_json(br#"{"message":"hi"}"#).await.unwrap_err();
        assert!(matches!(err, RelayError::MissingCredential));
        assert_eq!(err.status().as_u16(), 500);
        assert!(err.public_message().contains("API configuration error"));
        assert_eq!(generator.calls(), 0);
        assert!(!relay.is_configured());
    }

    #[tokio::test]
    async fn validation_runs_before_credential_check() {
        let generator = ScriptedGenerator::new(|| Ok("unused".into()));
        let relay = relay_with(ProviderConfig::default(), generator);

        let err = relay.relay_json(br#"{"message":" "}"#).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn history_is_folded_without_greeting() {
        let generator = ScriptedGenerator::new(|| Ok("ok".into()));
        let relay = relay_with(configured(), generator.clone());

        let request = ChatRequest::new(
            "C",
            vec![
                ChatTurn::assistant(DEFAULT_GREETING),
                ChatTurn::user("A"),
                ChatTurn::assistant("B"),
            ],
        )
        .unwrap();
        relay.relay(&request).await.unwrap();

        let prompt = generator.prompts.lock().unwrap()[0].clone();
        assert!(!prompt.contains(DEFAULT_GREETING));
        let a = prompt.find("user: A").unwrap();
        let b = prompt.find("assistant: B").unwrap();
        let c = prompt.find("Current message: C").unwrap();
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn sends_configured_system_instruction() {
        let generator = ScriptedGenerator::new(|| Ok("ok".into()));
        let config = ProviderConfig {
            system_instruction: "Only sleep advice.".into(),
            ..configured()
        };
        let relay = relay_with(config, generator.clone());

        relay.relay_json(br#"{"message":"hi"}"#).await.unwrap();
        assert_eq!(generator.instructions.lock().unwrap()[0], "Only sleep advice.");
    }

    #[tokio::test]
    async fn empty_provider_text_is_an_error() {
        let outcomes: [fn() -> Result<String, ProviderError>; 2] =
            [|| Ok(String::new()), || Ok("  \n ".into())];
        for outcome in outcomes {
            let relay = relay_with(configured(), ScriptedGenerator::new(outcome));
            let err = relay.relay_json(br#"{"message":"hi"}"#).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EmptyResponseError);
            assert_eq!(err.status().as_u16(), 500);
        }
    }

    #[tokio::test]
    async fn quota_failure_is_classified() {
        let generator = ScriptedGenerator::new(|| {
            Err(ProviderError::Other("quota exceeded for project".into()))
        });
        let relay = relay_with(configured(), generator.clone());

        let err = relay.relay_json(br#"{"message":"hi"}"#).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        assert_eq!(err.status().as_u16(), 429);
        assert_eq!(generator.calls(), 1, "no retries");
    }

    #[test]
    fn client_faults_log_as_warnings() {
        let blank = RelayError::InvalidRequest("Message is required".into());
        assert_eq!(failure_level(&blank), Level::WARN);

        let rate_limited = RelayError::from_provider(ProviderError::Other("quota".into()));
        assert_eq!(failure_level(&rate_limited), Level::WARN);

        assert_eq!(failure_level(&RelayError::MissingCredential), Level::ERROR);
        assert_eq!(failure_level(&RelayError::EmptyResponse), Level::ERROR);
        let unreachable = RelayError::from_provider(ProviderError::Network("refused".into()));
        assert_eq!(failure_level(&unreachable), Level::ERROR);
    }

    #[tokio::test]
    async fn identical_requests_give_identical_results() {
        let generator = ScriptedGenerator::new(|| Ok("Same answer".into()));
        let relay = relay_with(configured(), generator.clone());
        let body = br#"{"message":"hi","messages":[{"role":"user","content":"earlier"}]}"#;

        let first = relay.relay_json(body).await.unwrap();
        let second = relay.relay_json(body).await.unwrap();
        assert_eq!(first, second);

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts[0], prompts[1]);
    }
}
