//! Closed enumerations and pre-flight checks.
//!
//! Every check here runs before a request is built, so a rejected value never reaches the
//! Platform.

use std::fmt;

use crate::error::{ProviderError, ProviderResult};

pub const TTL_CHOICES: &[&str] =
    &["", "3h", "6h", "1d", "3d", "7d", "30d", "60d", "90d", "180d", "365d"];

pub const SESSION_TYPE_CHOICES: &[&str] = &["", "direct", "client", "script", "cli", "services"];

pub const TIMEOUT_CHOICES: &[&str] = &[
    "", "15m", "30m", "1h", "2h", "3h", "6h", "1d", "3d", "7d", "15d", "30d", "60d", "90d",
    "180d", "365d", "99999d",
];

pub const MEMORY_CHOICES: &[&str] =
    &["", "128Mi", "256Mi", "512Mi", "1024Mi", "2048Mi", "4096Mi", "8192Mi"];

pub const CPU_CHOICES: &[&str] = &["", "0.125", "0.25", "0.5", "1", "2", "4", "8"];

pub const SSL_MODE_CHOICES: &[&str] =
    &["", "prefer", "allow", "require", "verify-ca", "verify-full", "disable"];

pub const AUTHORIZATION_RESOURCE_TYPES: &[&str] = &[
    "kubernetes",
    "mongo",
    "mongodb_atlas",
    "mongodb_aws_secrets_manager",
    "mongo36",
    "elasticsearch",
    "ssh",
    "postgres",
    "mysql",
    "sql_server",
    "sqlserver_aws_secrets_manager",
    "postgres_aws_secrets_manager",
    "mysql_aws_secrets_manager",
    "yugabytedb",
    "cockroachdb",
    "proxysql",
];

pub const DEFAULT_MEMORY: &str = "256Mi";
pub const DEFAULT_CPU: &str = "0.5";

/// Reject `value` unless it matches one of `allowed` exactly.
pub fn choice(attribute: &str, value: &str, allowed: &[&str]) -> ProviderResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ProviderError::invalid_enum(attribute, value, allowed))
    }
}

/// Reject lists containing empty or whitespace-only entries.
pub fn non_empty_entries(attribute: &str, values: &[String]) -> ProviderResult<()> {
    match values.iter().position(|v| v.trim().is_empty()) {
        Some(index) => Err(ProviderError::invalid_attribute(
            attribute,
            format!("entry {} must be a non-empty string", index),
        )),
        None => Ok(()),
    }
}

/// Wire-level session type after canonicalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    Cli,
    Client,
    Services,
}

impl SessionType {
    const CANONICAL: &'static [&'static str] = &["", "direct", "cli", "client", "services"];

    /// Map the host value onto the wire value: `""` and `direct` become `cli`.
    pub fn canonicalise(raw: &str) -> ProviderResult<Self> {
        choice("type", raw, SESSION_TYPE_CHOICES)?;
        match raw {
            "" | "direct" | "cli" => Ok(Self::Cli),
            "client" => Ok(Self::Client),
            "services" => Ok(Self::Services),
            other => Err(ProviderError::invalid_enum("type", other, Self::CANONICAL)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Client => "client",
            Self::Services => "services",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
