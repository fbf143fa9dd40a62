//! Credential profiles and component-to-test mappings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credential fields that are safe to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayCredential {
    pub account_id: String,
    pub username: String,
    #[serde(default)]
    pub execution_instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProfile {
    pub profile_name: String,
    pub credentials: DisplayCredential,
}

/// Body of `POST /credentials`. Carries the secret; never log it unredacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCredentialRequest {
    pub profile_name: String,
    pub account_id: String,
    pub username: String,
    pub password_or_token: String,
    pub execution_instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    pub id: String,
    pub main_component_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_component_name: Option<String>,
    pub test_component_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deployed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_packaged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /mappings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMappingRequest {
    pub main_component_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_component_name: Option<String>,
    pub test_component_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deployed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_packaged: Option<bool>,
}
