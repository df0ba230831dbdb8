//! Host-facing diagnostics.

use serde::Serialize;

use crate::error::{ProviderError, ProviderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One message the host renders to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

/// Diagnostics produced by a successful call (warnings only).
pub type Diagnostics = Vec<Diagnostic>;

impl Diagnostic {
    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, summary: summary.into(), detail: detail.into() }
    }

    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { severity: Severity::Error, summary: summary.into(), detail: detail.into() }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&ProviderError> for Diagnostic {
    fn from(err: &ProviderError) -> Self {
        let summary = match err {
            ProviderError::AuthenticationFailed => "Authentication failed",
            ProviderError::DuplicateName { .. } => "Duplicate name",
            ProviderError::InvalidEnum { .. } => "Invalid value",
            ProviderError::InvalidKind(_) => "Unknown integration type",
            ProviderError::InvalidAttribute { .. } => "Invalid attribute",
            ProviderError::ImmutableAttribute { .. } => "Attribute cannot be changed",
            ProviderError::Platform { .. } => "Platform request failed",
            ProviderError::AsyncTimeout { .. } => "Timed out waiting for the platform",
            ProviderError::AsyncFailed { .. } => "Platform reported a failure",
            ProviderError::DeleteFailed { .. } => "Delete failed",
            ProviderError::Network(_) => "Network error",
            ProviderError::Decode(_) => "Unexpected platform response",
            ProviderError::Config(_) => "Provider configuration error",
            ProviderError::Cancelled => "Operation cancelled",
            ProviderError::OperationTimeout { .. } => "Operation timed out",
        };
        Self::error(summary, err.to_string())
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        Self::from(&err)
    }
}

/// Flatten a CRUD outcome into what the host renders: the warnings of a successful call, or one
/// error diagnostic.
pub fn collect(result: ProviderResult<Diagnostics>) -> Diagnostics {
    match result {
        Ok(diagnostics) => diagnostics,
        Err(error) => vec![Diagnostic::from(&error)],
    }
}
