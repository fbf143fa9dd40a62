//! Test plan documents and the requests that create or advance them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::results::TestExecutionResult;

/// Full test plan as returned by `GET /test-plans/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPlan {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plan_components: Vec<PlanComponent>,
}

impl TestPlan {
    /// Minimal plan with only an id and status tag set.
    pub fn with_status(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            status: status.into(),
            failure_reason: None,
            created_at: None,
            updated_at: None,
            plan_components: Vec::new(),
        }
    }
}

/// Row in the `GET /test-plans` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPlanSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A discovered component inside a plan, with its tests and any results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanComponent {
    pub id: String,
    #[serde(default)]
    pub test_plan_id: String,
    pub component_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default)]
    pub available_tests: Vec<AvailableTest>,
    #[serde(default)]
    pub execution_results: Vec<TestExecutionResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Whether discovery inputs name components under test or tests directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    #[default]
    Component,
    Test,
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanType::Component => f.write_str("COMPONENT"),
            PlanType::Test => f.write_str("TEST"),
        }
    }
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "COMPONENT" => Ok(PlanType::Component),
            "TEST" => Ok(PlanType::Test),
            other => Err(format!("unknown plan type '{other}'; expected COMPONENT or TEST")),
        }
    }
}

/// Body of `POST /test-plans`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateDiscoveryRequest {
    pub name: String,
    pub plan_type: PlanType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folder_names: Vec<String>,
    pub credential_profile: String,
    pub discover_dependencies: bool,
}

impl InitiateDiscoveryRequest {
    /// Number of ids, names and folders supplied as discovery inputs.
    pub fn input_count(&self) -> usize {
        self.component_ids.len() + self.component_names.len() + self.folder_names.len()
    }
}

/// Body of `POST /test-plans/{id}/execute`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateExecutionRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests_to_run: Vec<String>,
    pub credential_profile: String,
}
