//! Automated Test Orchestrator API client.
//!
//! This crate provides a lightweight client for the orchestration service's
//! REST API. It focuses on:
//!
//! - Building an HTTP client from an explicit [`ClientConfig`]
//! - Validating the configured base URL
//! - Classifying failures into [`ClientError`] (network vs. API errors)
//! - Typed endpoint methods for plans, results, credentials and mappings
//!
//! # Example
//!
//! ```ignore
//! use ato_api::{ClientConfig, OrchestratorClient};
//!
//! let config = ClientConfig::new("http://localhost:3001/api/v1")?;
//! let client = OrchestratorClient::new(config)?;
//! let plan = client.get_plan("3f2c").await?;
//! println!("status: {}", plan.status);
//! ```

use std::env;
use std::time::{Duration, Instant};

use ato_util::http::parse_json_strict;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url, header};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

mod endpoints;
pub mod error;

pub use error::{ClientError, NetworkErrorKind, classify_status, classify_transport_error};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api/v1";
/// Per-request timeout used when nothing else is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Explicit settings for an [`OrchestratorClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Validate `base_url` and build a config with default timeout and user agent.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: format!("ato-cli/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// Thin wrapper around a configured `reqwest::Client` for the orchestration API.
///
/// Requests are resolved relative to the configured base URL and share a
/// User-Agent and JSON `Accept` header.
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl OrchestratorClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| ClientError::invalid_config(format!("could not build the HTTP client: {error}")))?;

        Ok(Self {
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            http,
            user_agent: config.user_agent,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    /// Send a request and return the body text when the status is one of `expected`.
    ///
    /// Transport failures become [`ClientError::Network`]; any other status
    /// becomes [`ClientError::Api`].
    pub(crate) async fn execute<F>(&self, method: Method, path: &str, expected: &[StatusCode], prepare: F) -> Result<(StatusCode, String), ClientError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let start = Instant::now();
        let builder = prepare(self.request(method.clone(), path));

        let response = builder.send().await.map_err(|error| {
            let classified = classify_transport_error(&error);
            warn!(
                method = %method,
                path = %path,
                error = %error,
                connection_refused = classified.is_connection_refused(),
                duration_ms = start.elapsed().as_millis(),
                "http request failed before a response arrived"
            );
            classified
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| classify_transport_error(&error))?;

        if !expected.contains(&status) {
            warn!(
                method = %method,
                path = %path,
                status = %status,
                body_len = body.len(),
                duration_ms = start.elapsed().as_millis(),
                "http request returned an unexpected status"
            );
            return Err(classify_status(status, &body));
        }

        debug!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "http request completed"
        );
        Ok((status, body))
    }

    /// Like [`Self::execute`], decoding the body as JSON.
    pub(crate) async fn execute_json<T, F>(&self, method: Method, path: &str, expected: &[StatusCode], prepare: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let (status, body) = self.execute(method, path, expected, prepare).await?;
        Ok(parse_json_strict(&body, Some(status))?)
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// The URL must parse, use `http` or `https`, and include a host.
fn validate_base_url(base: &str) -> Result<Url, ClientError> {
    let parsed = Url::parse(base.trim()).map_err(|error| ClientError::invalid_config(format!("invalid API URL '{base}': {error}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::invalid_config(format!(
            "API URL must use http or https; got '{}://'",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ClientError::invalid_config("API URL must include a host"));
    }
    Ok(parsed)
}
