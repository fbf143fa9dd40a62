//! Helpers shared by the ATO client crates: secret redaction for log output,
//! strict response parsing, mapping CSV import and URL path-segment encoding.

use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;

pub mod http;
pub mod mapping_csv;

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([\w\-\.=:/+ ]+)",
        r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
        r#"(?i)("[a-z_]*(?:password|token|secret)[a-z_]*"\s*:\s*)("(?:[^"\\]|\\.)*")"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// Handles `Authorization:` header lines, `FOO_TOKEN=value` assignments and
/// JSON members whose key mentions a password, token or secret.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in SENSITIVE_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                if prefix.starts_with('"') {
                    format!("{}\"<redacted>\"", prefix)
                } else {
                    format!("{}<redacted>", prefix)
                }
            })
            .to_string();
    }
    redacted
}

/// Characters escaped when a value is spliced into a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a value for use as one URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}
