//! # HTTP Utilities
//!
//! Response-body helpers used by the API client: strict JSON decoding with a
//! readable body preview, and extraction of a human-readable message from a
//! failed response.

use ato_types::ApiErrorResponse;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Message used when a failed response carries no body at all.
pub const NO_ERROR_DETAILS: &str = "No additional details provided by the server.";

/// Pick the most useful message out of an error response body.
///
/// Resolution order:
/// 1. `metadata.message` from the service's structured error envelope
/// 2. the raw body text
/// 3. [`NO_ERROR_DETAILS`] when the body is empty
///
/// # Example
/// ```rust
/// use ato_util::http::{error_message_from_body, NO_ERROR_DETAILS};
///
/// assert_eq!(error_message_from_body(r#"{"metadata":{"message":"not found"}}"#), "not found");
/// assert_eq!(error_message_from_body("Bad Gateway"), "Bad Gateway");
/// assert_eq!(error_message_from_body(""), NO_ERROR_DETAILS);
/// ```
pub fn error_message_from_body(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorResponse>(body)
        && let Some(message) = envelope.message()
    {
        return message.to_string();
    }
    if body.is_empty() {
        return NO_ERROR_DETAILS.to_string();
    }
    body.to_string()
}

/// Parse HTTP response text into `T`, providing detailed errors on failure.
///
/// Any parsing error is decorated with the originating HTTP status code plus
/// a truncated preview of the response body so malformed payloads can be
/// diagnosed from the error message alone.
pub fn parse_json_strict<T: DeserializeOwned>(text: &str, status: Option<StatusCode>) -> Result<T, JsonParseError> {
    serde_json::from_str::<T>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, 200);

        JsonParseError::new(status_note, error, preview)
    })
}

fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ato_types::{ApiEnvelope, CreatedResource};

    #[test]
    fn error_message_prefers_structured_envelope() {
        let body = r#"{"metadata":{"message":"Test plan with ID x not found"},"data":null}"#;
        assert_eq!(error_message_from_body(body), "Test plan with ID x not found");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(error_message_from_body(r#"{"error":"boom"}"#), r#"{"error":"boom"}"#);
        assert_eq!(error_message_from_body("upstream timed out"), "upstream timed out");
    }

    #[test]
    fn error_message_uses_placeholder_for_empty_body() {
        assert_eq!(error_message_from_body(""), NO_ERROR_DETAILS);
    }

    #[test]
    fn whitespace_body_is_passed_through() {
        assert_eq!(error_message_from_body(" \n"), " \n");
    }

    #[test]
    fn strict_parse_reports_status_and_preview() {
        let error = parse_json_strict::<ApiEnvelope<CreatedResource>>("<html>\n\toops</html>", Some(StatusCode::CREATED))
            .expect_err("html is not json");
        assert_eq!(error.body_preview(), "<html> oops</html>");
        assert!(error.to_string().contains("status 201 Created"));
    }

    #[test]
    fn strict_parse_marks_empty_bodies() {
        let error = parse_json_strict::<ApiEnvelope<CreatedResource>>("", None).expect_err("empty body");
        assert_eq!(error.body_preview(), "<empty>");
        assert!(error.to_string().contains("unknown status"));
    }

    #[test]
    fn truncate_preview_caps_length() {
        let long = "a".repeat(300);
        let preview = truncate_response_preview(&long, 10);
        assert_eq!(preview, format!("{}...", "a".repeat(10)));
    }
}
