//! Chat data model — turns and inbound requests.
//!
//! Everything here is request-scoped; nothing is stored between calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;

/// Returned to the caller when `message` is missing, empty, or not text.
pub const MESSAGE_REQUIRED: &str = "Message is required and must be a non-empty string";

const BODY_NOT_OBJECT: &str = "Request body must be a JSON object";
const HISTORY_MALFORMED: &str =
    "Conversation history must be a list of turns with a role and content";

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A validated chat request: the latest user message plus prior turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Latest user message, already trimmed and known to be non-empty.
    message: String,
    /// Prior turns in caller order.
    pub history: Vec<ChatTurn>,
}

impl ChatRequest {
    /// Build a request from a raw message, rejecting blank input.
    pub fn new(message: &str, history: Vec<ChatTurn>) -> Result<Self, RelayError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(RelayError::InvalidRequest(MESSAGE_REQUIRED.into()));
        }
        Ok(Self {
            message: message.to_string(),
            history,
        })
    }

    /// Parse and validate a JSON request body.
    ///
    /// The history is read from `messages`, falling back to `history`.
    /// The message is validated before the history so a blank message always
    /// reports the message error.
    pub fn from_json(body: &[u8]) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| RelayError::InvalidRequest(MESSAGE_REQUIRED.into()))?;

        let Value::Object(mut fields) = value else {
            return Err(RelayError::InvalidRequest(BODY_NOT_OBJECT.into()));
        };

        let message = match fields.get("message") {
            Some(Value::String(s)) => s.clone(),
            _ => return Err(RelayError::InvalidRequest(MESSAGE_REQUIRED.into())),
        };
        if message.trim().is_empty() {
            return Err(RelayError::InvalidRequest(MESSAGE_REQUIRED.into()));
        }

        let raw_history = fields
            .remove("messages")
            .or_else(|| fields.remove("history"))
            .unwrap_or(Value::Null);
        let history = match raw_history {
            Value::Null => Vec::new(),
            other => serde_json::from_value::<Vec<ChatTurn>>(other)
                .map_err(|_| RelayError::InvalidRequest(HISTORY_MALFORMED.into()))?,
        };

        Self::new(&message, history)
    }

    /// The trimmed user message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
