//! Wire models shared by the ATO client crates.
//!
//! Every successful response from the orchestration service wraps its payload
//! in a `{ "data": ... }` envelope ([`ApiEnvelope`]); failures carry a
//! `{ "metadata": { "message": ... } }` object ([`ApiErrorResponse`]). The
//! remaining types mirror the JSON documents exchanged with the service and
//! use camelCase field names on the wire.

use serde::{Deserialize, Serialize};

pub mod plan;
pub mod profiles;
pub mod results;

pub use plan::{
    AvailableTest, InitiateDiscoveryRequest, InitiateExecutionRequest, PlanComponent, PlanType, TestPlan, TestPlanSummary,
};
pub use profiles::{AddCredentialRequest, CreateMappingRequest, CredentialProfile, DisplayCredential, Mapping};
pub use results::{ExecutionResult, ResultFilters, TestCaseResult, TestExecutionResult};

/// Status tags reported by the service for a test plan.
///
/// The set is open: the service may introduce new tags, so callers match on
/// these constants and fall through to a default arm.
pub mod status {
    pub const DISCOVERING: &str = "DISCOVERING";
    pub const DISCOVERY_FAILED: &str = "DISCOVERY_FAILED";
    pub const AWAITING_SELECTION: &str = "AWAITING_SELECTION";
    pub const EXECUTING: &str = "EXECUTING";
    pub const EXECUTION_FAILED: &str = "EXECUTION_FAILED";
    pub const COMPLETED: &str = "COMPLETED";
}

/// Result status values for a single executed test.
pub mod result_status {
    pub const SUCCESS: &str = "SUCCESS";
    pub const FAILURE: &str = "FAILURE";
    pub const PASSED: &str = "PASSED";
    pub const FAILED: &str = "FAILED";
}

/// Standard `{ "data": ... }` envelope around successful payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// Minimal body returned by create-style endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResource {
    pub id: String,
}

/// Structured error body returned by the service for non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub metadata: Option<ApiErrorMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorMetadata {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorResponse {
    /// The nested `metadata.message`, when present and not blank.
    pub fn message(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.message.as_deref())
            .filter(|message| !message.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_exposes_nested_message() {
        let parsed: ApiErrorResponse = serde_json::from_str(r#"{"metadata":{"message":"not found"}}"#).unwrap();
        assert_eq!(parsed.message(), Some("not found"));
    }

    #[test]
    fn error_response_ignores_blank_or_missing_message() {
        let blank: ApiErrorResponse = serde_json::from_str(r#"{"metadata":{"message":"  "}}"#).unwrap();
        assert_eq!(blank.message(), None);

        let missing: ApiErrorResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(missing.message(), None);
    }

    #[test]
    fn envelope_unwraps_created_resource() {
        let parsed: ApiEnvelope<CreatedResource> = serde_json::from_str(r#"{"data":{"id":"plan-1","status":"DISCOVERING"}}"#).unwrap();
        assert_eq!(parsed.data.id, "plan-1");
    }
}
