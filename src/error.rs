//! Error types for the provider core.
//!
//! Two layers:
//! - [`RetryError`] is the generic outcome of the bounded-retry primitive and knows nothing
//!   about the Platform.
//! - [`ProviderError`] is the closed taxonomy every controller returns. Tests assert on the
//!   variant, never on the rendered message.
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::client::{Entity, Operation};

/// Result alias used across the crate.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Outcome of a retry loop that did not produce an accepted value.
#[derive(Debug, Clone)]
pub enum RetryError<E> {
    /// The overall deadline elapsed before an attempt could start.
    Timeout { elapsed: Duration, timeout: Duration, attempts: usize },
    /// `retry_limit` attempts were made without an accepted result.
    MaxRetriesReached { attempts: usize, last: Option<E> },
    /// The caller's cancellation token fired between attempts.
    Cancelled { attempts: usize },
    /// The operation failed with an error the checker declared permanent.
    Inner(E),
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { elapsed, timeout, attempts } => write!(
                f,
                "retry deadline exceeded after {:?} and {} attempts (limit: {:?})",
                elapsed, attempts, timeout
            ),
            Self::MaxRetriesReached { attempts, last: Some(last) } => {
                write!(f, "max retries reached after {} attempts; last error: {}", attempts, last)
            }
            Self::MaxRetriesReached { attempts, last: None } => {
                write!(f, "max retries reached after {} attempts; result never accepted", attempts)
            }
            Self::Cancelled { attempts } => {
                write!(f, "retry cancelled after {} attempts", attempts)
            }
            Self::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inner(e) => Some(e),
            Self::MaxRetriesReached { last: Some(e), .. } => Some(e),
            _ => None,
        }
    }
}

impl<E> RetryError<E> {
    /// Check if the deadline elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if the attempt budget was exhausted.
    pub fn is_max_retries(&self) -> bool {
        matches!(self, Self::MaxRetriesReached { .. })
    }

    /// Number of attempts made, when known.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            Self::MaxRetriesReached { attempts, .. }
            | Self::Cancelled { attempts }
            | Self::Timeout { attempts, .. } => Some(*attempts),
            Self::Inner(_) => None,
        }
    }

    /// Get the inner error if this is an `Inner` variant.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
}

/// Every failure a controller can surface to the host.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The Platform answered 401.
    #[error("authentication failed: the service token was rejected by the platform")]
    AuthenticationFailed,

    /// The Platform answered 409 for a create or update.
    #[error("an object named {name:?} already exists")]
    DuplicateName { name: String },

    /// An enumerated attribute carried a value outside its closed set.
    #[error(
        "invalid value {value:?} for {attribute}; allowed values: {}",
        render_allowed(.allowed)
    )]
    InvalidEnum { attribute: String, value: String, allowed: Vec<String> },

    /// The integration `type` is not part of the registry.
    #[error("unknown integration type {0:?}")]
    InvalidKind(String),

    /// An attribute is present but malformed (wrong shape, empty list entry, missing value).
    #[error("invalid attribute {attribute}: {reason}")]
    InvalidAttribute { attribute: String, reason: String },

    /// The host's diff changed an attribute that cannot change after create.
    #[error("attribute {attribute} cannot be changed after creation")]
    ImmutableAttribute { attribute: String },

    /// Non-2xx answer from the Platform.
    #[error("failed to {operation} {entity}: {reason} (status {status})")]
    Platform { entity: Entity, operation: Operation, status: u16, reason: String },

    /// The object never left `creating` within the poll budget. The id is already recorded.
    #[error("{entity} {id} is still creating after {attempts} status checks")]
    AsyncTimeout { entity: Entity, id: String, attempts: usize },

    /// The object settled in a state other than `created`.
    #[error("{entity} {id} settled in status {status:?}")]
    AsyncFailed { entity: Entity, id: String, status: String },

    /// The session delete protocol could not confirm removal.
    #[error("could not delete session {id}: {reason}")]
    DeleteFailed { id: String, reason: String },

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// A response or payload could not be (de)serialised.
    #[error("decode error: {0}")]
    Decode(String),

    /// Provider configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The host cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The whole CRUD call exceeded its wall-clock budget.
    #[error("operation timed out after {elapsed:?} (limit: {timeout:?})")]
    OperationTimeout { elapsed: Duration, timeout: Duration },
}

fn render_allowed(allowed: &[String]) -> String {
    allowed.iter().map(|v| format!("{:?}", v)).collect::<Vec<_>>().join(", ")
}

impl ProviderError {
    /// Build an `InvalidEnum` from a static choice list.
    pub fn invalid_enum(attribute: &str, value: &str, allowed: &[&str]) -> Self {
        Self::InvalidEnum {
            attribute: attribute.to_owned(),
            value: value.to_owned(),
            allowed: allowed.iter().map(|v| (*v).to_owned()).collect(),
        }
    }

    /// Build an `InvalidAttribute`.
    pub fn invalid_attribute(attribute: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute { attribute: attribute.to_owned(), reason: reason.into() }
    }

    /// Whether a poll loop may try again after this error.
    ///
    /// Authentication and duplicate-name failures are final, as are local validation errors.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Platform { .. } | Self::Network(_) | Self::Decode(_))
    }

    /// Whether the Platform reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Platform { status: 404, .. })
    }

    /// Whether the error was raised before any request left the process.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::InvalidEnum { .. }
                | Self::InvalidKind(_)
                | Self::InvalidAttribute { .. }
                | Self::ImmutableAttribute { .. }
        )
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<serde_yaml::Error> for ProviderError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct DummyError(&'static str);

    impl fmt::Display for DummyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for DummyError {}

    #[test]
    fn max_retries_display_includes_last_error() {
        let err = RetryError::MaxRetriesReached { attempts: 3, last: Some(DummyError("boom")) };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("boom"));
        assert!(err.source().is_some());
    }

    #[test]
    fn max_retries_without_error_mentions_result() {
        let err: RetryError<DummyError> = RetryError::MaxRetriesReached { attempts: 2, last: None };
        assert!(err.to_string().contains("never accepted"));
        assert!(err.source().is_none());
        assert_eq!(err.attempts(), Some(2));
    }

    #[test]
    fn predicates_cover_variants() {
        let timeout: RetryError<DummyError> = RetryError::Timeout {
            elapsed: Duration::from_secs(2),
            timeout: Duration::from_secs(1),
            attempts: 3,
        };
        assert!(timeout.is_timeout());
        assert!(!timeout.is_max_retries());
        assert_eq!(timeout.attempts(), Some(3));

        let inner = RetryError::Inner(DummyError("x"));
        assert_eq!(inner.into_inner(), Some(DummyError("x")));
    }

    #[test]
    fn invalid_enum_lists_allowed_values() {
        let err = ProviderError::invalid_enum("ttl", "2d", &["", "3h", "1d"]);
        let msg = err.to_string();
        assert!(msg.contains("ttl"));
        assert!(msg.contains("\"2d\""));
        assert!(msg.contains("\"3h\""));
        assert!(err.is_preflight());
    }

    #[test]
    fn auth_and_duplicate_are_not_retryable() {
        assert!(!ProviderError::AuthenticationFailed.is_retryable());
        assert!(!ProviderError::DuplicateName { name: "db".into() }.is_retryable());
        assert!(ProviderError::Network("reset".into()).is_retryable());
        let platform = ProviderError::Platform {
            entity: Entity::Resource,
            operation: Operation::Read,
            status: 404,
            reason: "gone".into(),
        };
        assert!(platform.is_retryable());
        assert!(platform.is_not_found());
    }
}
