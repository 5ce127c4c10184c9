//! Google Gemini provider.
//!
//! Calls `POST {base}/v1beta/models/{model}:generateContent` once per prompt.
//! No retries; failures are returned as structured [`ProviderError`]s.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::{Host, Url};

use super::{ProviderError, TextGenerator};
use crate::config::{ApiKey, ProviderConfig};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Gemini `generateContent` client.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Build a client for the configured model, base URL and timeout.
    ///
    /// Loopback base URLs (local emulators, test fakes) bypass any system proxy.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder().timeout(config.timeout);
        if is_loopback(&config.base_url) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(
        &self,
        credential: &ApiKey,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![TextPart {
                    text: system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![TextPart { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "calling Gemini");

        let resp = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(parse_error_body(status.as_u16(), &body));
        }

        let data: GenerateContentResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(e)
            } else {
                ProviderError::Malformed(format!("Gemini response parse error: {e}"))
            }
        })?;

        Ok(extract_text(data))
    }
}

fn is_loopback(base_url: &str) -> bool {
    let Ok(url) = Url::parse(base_url) else {
        return false;
    };
    match url.host() {
        Some(Host::Domain(d)) => d == "localhost",
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Network(format!("Gemini request timed out: {e}"))
    } else if e.is_connect() || e.is_request() {
        ProviderError::Network(format!("Gemini request failed: {e}"))
    } else {
        ProviderError::Other(format!("Gemini request failed: {e}"))
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(data: GenerateContentResponse) -> String {
    if let Some(reason) = data.prompt_feedback.and_then(|f| f.block_reason) {
        warn!(block_reason = %reason, "Gemini blocked the prompt");
    }

    let Some(candidate) = data.candidates.into_iter().next() else {
        return String::new();
    };

    if let Some(reason) = candidate.finish_reason.as_deref()
        && reason != "STOP"
    {
        debug!(finish_reason = reason, "Gemini finished early");
    }

    candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Turn a non-success body into a structured error.
///
/// Falls back to the raw body when it is not Google's error envelope.
fn parse_error_body(code: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let err = envelope.error;
            ProviderError::Status {
                code: err.code.unwrap_or(code),
                status: err.status,
                reason: err.details.into_iter().find_map(|d| d.reason),
                message: err.message.unwrap_or_else(|| body.to_string()),
            }
        }
        Err(_) => ProviderError::Status {
            code,
            status: None,
            reason: None,
            message: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn request_serializes_in_gemini_shape() {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![TextPart { text: "policy" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![TextPart { text: "hi" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "systemInstruction": { "parts": [{ "text": "policy" }] },
                "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }]
            })
        );
    }

    #[test]
    fn extracts_and_joins_text_parts() {
        let data = response(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hydration\n"},{"text":"Drink water."}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_text(data), "Hydration\nDrink water.");
    }

    #[test]
    fn no_candidates_yields_empty_text() {
        let data = response(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert_eq!(extract_text(data), "");
    }

    #[test]
    fn candidate_without_content_yields_empty_text() {
        let data = response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert_eq!(extract_text(data), "");
    }

    #[test]
    fn parses_google_error_envelope() {
        let body = r#"{
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [
                    {"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID", "domain": "googleapis.com"}
                ]
            }
        }"#;
        let err = parse_error_body(400, body);
        assert_eq!(err.code(), Some(400));
        assert_eq!(err.status(), Some("INVALID_ARGUMENT"));
        assert_eq!(err.reason(), Some("API_KEY_INVALID"));
        assert_eq!(err.message(), "API key not valid. Please pass a valid API key.");
    }

    #[test]
    fn non_json_error_body_keeps_raw_text() {
        let err = parse_error_body(502, "Bad Gateway");
        assert_eq!(err.code(), Some(502));
        assert_eq!(err.status(), None);
        assert_eq!(err.message(), "Bad Gateway");
    }

    #[test]
    fn detects_loopback_base_urls() {
        assert!(is_loopback("http://localhost:8080"));
        assert!(is_loopback("http://127.0.0.1:9000"));
        assert!(is_loopback("http://[::1]:9000"));
        assert!(!is_loopback("https://generativelanguage.googleapis.com"));
        assert!(!is_loopback("not a url"));
    }

    #[test]
    fn endpoint_includes_model() {
        let config = ProviderConfig {
            base_url: "http://localhost:8080/".into(),
            model: "gemini-test".into(),
            ..ProviderConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(client.model(), "gemini-test");
    }
}
