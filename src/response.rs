//! Uniform JSON response envelopes.
//!
//! Two pure formatters shape every response body; the HTTP status code is
//! attached by the handler adapter so these stay free of I/O.

use serde::Serialize;
use serde_json::Value;

/// Envelope for successful responses.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    pub data: Value,
}

/// Envelope for validation and execution failures.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Shape a success envelope.
pub fn format_success(status: impl Into<String>, message: impl Into<String>, data: Value) -> SuccessEnvelope {
    SuccessEnvelope {
        status: status.into(),
        message: message.into(),
        detail: None,
        data,
    }
}

/// Shape an error envelope.
///
/// Prefers the underlying failure's message when present and non-empty,
/// falls back to the generic message otherwise. `error` is always `true`.
pub fn format_error(message: Option<&str>, fallback: &str, data: Option<Value>) -> ErrorEnvelope {
    let message = match message {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => fallback.to_string(),
    };
    ErrorEnvelope {
        error: true,
        message,
        data,
    }
}
