use reqwest::StatusCode;
use serde_json::Value;

use crate::errors::ClientError;

const SNIPPET_LEN: usize = 256;

/// Interpret a NodeODM reply.
///
/// NodeODM reports most failures as `{"error": "..."}`, often with HTTP 200.
/// A message mentioning "not found", or an HTTP 404, is [`ClientError::NotFound`].
pub(crate) fn parse_reply(status: StatusCode, body: &str) -> Result<Value, ClientError> {
    let value: Option<Value> = serde_json::from_str(body).ok();

    if let Some(msg) = value.as_ref().and_then(error_message) {
        if status == StatusCode::NOT_FOUND || msg.to_ascii_lowercase().contains("not found") {
            return Err(ClientError::NotFound(msg));
        }
        return Err(ClientError::Rejected(msg));
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(snippet(body)));
    }
    if !status.is_success() {
        return Err(ClientError::Status {
            status,
            body: snippet(body),
        });
    }

    value.ok_or_else(|| ClientError::InvalidResponse(format!("expected JSON, got: {}", snippet(body))))
}

fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(SNIPPET_LEN) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
