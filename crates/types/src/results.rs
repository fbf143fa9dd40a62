//! Execution results, both as embedded in a plan and as returned by the
//! results query endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one executed test, nested under a [`crate::PlanComponent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestExecutionResult {
    pub id: String,
    pub test_component_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_component_name: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCaseResult>,
}

/// A single assertion inside a test process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    #[serde(default)]
    pub test_case_id: Option<String>,
    pub test_description: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Enriched result row from `GET /test-execution-results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub id: String,
    pub test_plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_plan_name: Option<String>,
    pub plan_component_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    pub test_component_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_component_name: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCaseResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
}

/// Optional filters for the results query. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilters {
    pub test_plan_id: Option<String>,
    pub component_id: Option<String>,
    pub test_component_id: Option<String>,
    pub status: Option<String>,
}

impl ResultFilters {
    /// Query pairs for the filters that carry a non-blank value.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("testPlanId", &self.test_plan_id),
            ("componentId", &self.component_id),
            ("testComponentId", &self.test_component_id),
            ("status", &self.status),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| (key, value.to_string()))
        })
        .collect()
    }
}
