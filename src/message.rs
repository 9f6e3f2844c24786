// src/message.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::AppError, services::session_manager::DEFAULT_SESSION_ID};

pub const MESSAGE_REQUIRED: &str = "message is required";

/// Raw `/chat` body. Fields stay untyped so a wrong type is reported as a
/// validation error instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<Value>,
}

/// A request that passed validation.
#[derive(Debug, PartialEq, Eq)]
pub struct ChatTurn {
    pub session_id: String,
    pub message: String,
}

impl ChatRequest {
    pub fn validate(self) -> Result<ChatTurn, AppError> {
        let message = match self.message {
            Some(Value::String(m)) if !m.is_empty() => m,
            _ => return Err(AppError::BadRequest(MESSAGE_REQUIRED.to_string())),
        };

        let session_id = match self.session_id {
            None | Some(Value::Null) => DEFAULT_SESSION_ID.to_string(),
            Some(other) => session_key(other),
        };

        Ok(ChatTurn { session_id, message })
    }
}

/// Any JSON value is usable as a session key. Non-strings are keyed by their
/// JSON text behind a type tag, so `42` and `"42"` name different sessions.
fn session_key(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Bool(b) => format!("bool:{b}"),
        Value::Number(n) => format!("number:{n}"),
        other => format!("json:{other}"),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}
