//! Error taxonomy for the client. Every failure surfaces as one tagged
//! `ApiError`, produced at the API boundary, so callers can show a single
//! notification without probing response shapes themselves.

use serde_json::Value;
use thiserror::Error;

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The client could not be constructed or configured.
    #[error("configuration error: {0}")]
    Config(String),
    /// A presence check failed before any request was sent.
    #[error("{0}")]
    Input(String),
    /// The request never reached the server or no response arrived.
    #[error("unable to reach the server: {0}")]
    Transport(String),
    /// The configured deadline elapsed before a response arrived.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// The server rejected the stored session; the session store has
    /// already been cleared when this surfaces.
    #[error("session is no longer valid")]
    Unauthenticated,
    /// A 4xx response carrying a structured message field.
    #[error("request rejected ({status}): {message}")]
    Validation { status: u16, message: String },
    /// Any other non-success response.
    #[error("request failed ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("failed to encode request: {0}")]
    Serialization(String),
    #[error("failed to decode response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Classifies a failure response from its status and decoded body.
    pub(crate) fn from_failure(status: u16, body: &Value) -> Self {
        match structured_message(body) {
            Some(message) if (400..500).contains(&status) => Self::Validation { status, message },
            Some(message) => Self::Server { status, message },
            None => Self::Server {
                status,
                message: dump_body(body),
            },
        }
    }
}

/// Extracts the first message-bearing field from an error body, probing
/// `detail`, then `message`, then `error`. A field that is present but not
/// a string is serialized as-is.
fn structured_message(body: &Value) -> Option<String> {
    ["detail", "message", "error"].iter().find_map(|field| {
        let value = body.get(*field)?;
        match value.as_str() {
            Some(message) => Some(sanitize(message)),
            None => Some(dump_value(value)),
        }
    })
}

/// Serializes a whole error body for display when no known field is present.
fn dump_body(body: &Value) -> String {
    dump_value(body)
}

fn dump_value(value: &Value) -> String {
    match serde_json::to_string(value) {
        Ok(dump) => sanitize(&dump),
        Err(_) => "Request failed.".to_string(),
    }
}

/// Trims and truncates a message so oversized bodies stay readable in a
/// notification.
fn sanitize(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_field_wins_over_message_and_error() {
        let body = json!({"detail": "x", "message": "y", "error": "z"});
        match ApiError::from_failure(422, &body) {
            ApiError::Validation { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn message_field_wins_over_error() {
        let body = json!({"message": "y", "error": "z"});
        match ApiError::from_failure(400, &body) {
            ApiError::Validation { message, .. } => assert_eq!(message, "y"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_field_is_used_last() {
        let body = json!({"error": "z"});
        match ApiError::from_failure(403, &body) {
            ApiError::Validation { message, .. } => assert_eq!(message, "z"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_shape_is_dumped_and_classified_as_server() {
        let body = json!({"code": 17});
        match ApiError::from_failure(418, &body) {
            ApiError::Server { status, message } => {
                assert_eq!(status, 418);
                assert_eq!(message, r#"{"code":17}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn structured_message_on_5xx_is_server() {
        let body = json!({"detail": "boom"});
        match ApiError::from_failure(500, &body) {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_string_detail_is_serialized() {
        let body = json!({"detail": [{"loc": ["email"], "msg": "invalid"}]});
        match ApiError::from_failure(422, &body) {
            ApiError::Validation { message, .. } => {
                assert!(message.contains("invalid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn oversized_message_is_truncated() {
        let long = "a".repeat(500);
        let body = json!({ "detail": long });
        match ApiError::from_failure(400, &body) {
            ApiError::Validation { message, .. } => assert_eq!(message.chars().count(), 200),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_message_falls_back_to_generic_text() {
        let body = json!({"detail": "   "});
        match ApiError::from_failure(400, &body) {
            ApiError::Validation { message, .. } => assert_eq!(message, "Request failed."),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
