//! JSON bodies exchanged with the Platform.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `POST /resource/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub integration_type: String,
    pub name: String,
    /// YAML-serialised integration config.
    pub config: String,
    pub user_tags: Vec<String>,
    pub default_cluster: String,
}

/// `POST /resource/update/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    pub integration_type: String,
    pub config: String,
    pub user_tags: Vec<String>,
    pub default_cluster: String,
}

/// Session create and update share one body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    #[serde(rename = "sessionName")]
    pub session_name: String,
    #[serde(rename = "resourceName")]
    pub resource_name: String,
    #[serde(rename = "clusterName")]
    pub cluster_name: String,
    #[serde(rename = "authorizationName")]
    pub authorization_name: String,
    #[serde(rename = "sessionTTL")]
    pub session_ttl: String,
    #[serde(rename = "sessionType")]
    pub session_type: String,
    #[serde(rename = "sessionUsers")]
    pub session_users: Vec<String>,
    #[serde(rename = "isJITEnabled")]
    pub is_jit_enabled: bool,
    #[serde(rename = "accessApprovers")]
    pub access_approvers: Vec<String>,
    #[serde(rename = "pauseTimeout")]
    pub pause_timeout: String,
    #[serde(rename = "idleTimeout")]
    pub idle_timeout: String,
    pub memory: String,
    pub cpu: String,
    #[serde(rename = "usersTags")]
    pub users_tags: Vec<String>,
    pub groups: Vec<String>,
    #[serde(rename = "scriptOnlyAccess")]
    pub script_only_access: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub name: String,
    pub resource_type: String,
    pub description: String,
    pub permissions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRequest {
    pub name: String,
    pub command: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRequest {
    pub name: String,
    pub members: Vec<String>,
    pub endpoints: Vec<String>,
}

/// `{id}` returned by every create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// `{error}` returned with non-2xx answers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Free-form read response. Only `Status` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectState(Map<String, Value>);

impl ObjectState {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// State of an object the Platform no longer knows about.
    pub fn missing() -> Self {
        Self::default()
    }

    /// The `Status` field (`status` is accepted as a fallback).
    pub fn status(&self) -> Option<&str> {
        self.0.get("Status").or_else(|| self.0.get("status")).and_then(Value::as_str)
    }

    /// Case-insensitive status comparison.
    pub fn status_is(&self, expected: &str) -> bool {
        self.status().is_some_and(|status| status.eq_ignore_ascii_case(expected))
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }
}
