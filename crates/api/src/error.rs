//! Classification of failed HTTP round trips.
//!
//! Every request issued by [`crate::OrchestratorClient`] ends in one of two
//! failure shapes: the transport failed before a response arrived
//! ([`ClientError::Network`]) or the service answered with a status the
//! caller did not expect ([`ClientError::Api`]).

use std::error::Error as StdError;
use std::io;

use ato_util::http::{JsonParseError, error_message_from_body};
use reqwest::StatusCode;
use thiserror::Error;

/// Sub-case of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// Nothing is listening at the configured address.
    ConnectionRefused,
    /// DNS failures, timeouts, resets and everything else.
    Other,
}

impl NetworkErrorKind {
    /// User-facing description of the failure.
    pub fn message(self) -> &'static str {
        match self {
            NetworkErrorKind::ConnectionRefused => "Connection refused. Is the backend server running?",
            NetworkErrorKind::Other => "An unexpected network error occurred.",
        }
    }
}

/// Errors surfaced by [`crate::OrchestratorClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("Network Error: {}", .kind.message())]
    Network { kind: NetworkErrorKind, detail: String },

    /// The service answered with an unexpected status.
    #[error("API Error (Status {status_code}): {message}")]
    Api { status_code: u16, message: String },

    /// A success response whose body was not the expected JSON document.
    #[error("failed to decode successful API response: {0}")]
    Decode(#[from] JsonParseError),

    /// The client could not be built from the supplied configuration.
    #[error("invalid client configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ClientError {
    pub fn network(kind: NetworkErrorKind, detail: impl Into<String>) -> Self {
        Self::Network {
            kind,
            detail: detail.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }

    /// HTTP status for [`ClientError::Api`], `None` otherwise.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    pub fn is_connection_refused(&self) -> bool {
        matches!(
            self,
            ClientError::Network {
                kind: NetworkErrorKind::ConnectionRefused,
                ..
            }
        )
    }
}

/// Classify a transport-level `reqwest` failure.
pub fn classify_transport_error(error: &reqwest::Error) -> ClientError {
    let kind = if is_connection_refused(error) {
        NetworkErrorKind::ConnectionRefused
    } else {
        NetworkErrorKind::Other
    };
    ClientError::network(kind, error_chain_text(error))
}

/// Classify a completed round trip that returned an unexpected status.
pub fn classify_status(status: StatusCode, body: &str) -> ClientError {
    ClientError::Api {
        status_code: status.as_u16(),
        message: error_message_from_body(body),
    }
}

fn is_connection_refused(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = error.source();
    while let Some(current) = source {
        if let Some(io_error) = current.downcast_ref::<io::Error>()
            && io_error.kind() == io::ErrorKind::ConnectionRefused
        {
            return true;
        }
        source = current.source();
    }
    error.is_connect() && error_chain_text(error).to_ascii_lowercase().contains("connection refused")
}

fn error_chain_text(error: &reqwest::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(current) = source {
        text.push_str(": ");
        text.push_str(&current.to_string());
        source = current.source();
    }
    text
}
