//! Provider configuration.
//!
//! The service token is taken from the explicit input or from `ADAPTIVE_SVC_TOKEN`. It may be a
//! bare token or a JSON credentials blob in one of two shapes:
//!
//! ```json
//! {"token": "...", "url": "https://acme.adaptive.com"}
//! {"deployments": {"prod": {"url": "...", "token": "...", "name": "prod", "default": true}}}
//! ```
//!
//! In the deployments form the entry marked `default` wins, else the first entry in document
//! order. The workspace URL comes from the explicit input, then the credentials blob, then
//! [`DEFAULT_WORKSPACE_URL`], and always ends in `/api/v1`.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::clock::{Clock, MonotonicClock};
use crate::error::{ProviderError, ProviderResult};
use crate::poll::PollSettings;
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::timeout::DEFAULT_OPERATION_TIMEOUT;

pub const TOKEN_ENV: &str = "ADAPTIVE_SVC_TOKEN";
pub const DEFAULT_WORKSPACE_URL: &str = "https://app.adaptive.com/api/v1";
const API_SUFFIX: &str = "/api/v1";

/// Resolved credentials: token and normalised workspace URL.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    token: String,
    workspace_url: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("token", &"<redacted>")
            .field("workspace_url", &self.workspace_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct Credentials {
    token: Option<String>,
    url: Option<String>,
    deployments: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Deployment {
    url: Option<String>,
    token: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    default: bool,
}

impl ProviderConfig {
    /// Resolve from provider inputs, falling back to the process environment for the token.
    pub fn resolve(
        service_token: Option<&str>,
        workspace_url: Option<&str>,
    ) -> ProviderResult<Self> {
        Self::resolve_with(service_token, workspace_url, |key| std::env::var(key).ok())
    }

    /// [`resolve`](Self::resolve) with an injectable environment lookup.
    pub fn resolve_with<F>(
        service_token: Option<&str>,
        workspace_url: Option<&str>,
        env: F,
    ) -> ProviderResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = match service_token.filter(|t| !t.trim().is_empty()) {
            Some(token) => token.to_owned(),
            None => env(TOKEN_ENV).filter(|t| !t.trim().is_empty()).ok_or_else(|| {
                ProviderError::Config(format!(
                    "a service token is required; set service_token or {}",
                    TOKEN_ENV
                ))
            })?,
        };
        Self::from_parts(&token, workspace_url)
    }

    /// Build from an explicit token (bare or JSON) and optional workspace URL.
    pub fn from_parts(service_token: &str, workspace_url: Option<&str>) -> ProviderResult<Self> {
        let (token, embedded_url) = parse_token(service_token)?;
        let url = workspace_url
            .filter(|u| !u.trim().is_empty())
            .map(str::to_owned)
            .or(embedded_url)
            .unwrap_or_else(|| DEFAULT_WORKSPACE_URL.to_owned());
        let workspace_url = normalise_url(&url)?;
        debug!(workspace_url = %workspace_url, "resolved provider configuration");
        Ok(Self { token, workspace_url })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Workspace base URL, ending in `/api/v1`.
    pub fn workspace_url(&self) -> &str {
        &self.workspace_url
    }
}

fn parse_token(raw: &str) -> ProviderResult<(String, Option<String>)> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('{') {
        return Ok((trimmed.to_owned(), None));
    }

    let credentials: Credentials = serde_json::from_str(trimmed)
        .map_err(|error| ProviderError::Config(format!("invalid credentials JSON: {}", error)))?;

    if let Some(deployments) = credentials.deployments {
        let mut parsed = Vec::with_capacity(deployments.len());
        for (key, value) in deployments {
            let deployment: Deployment = serde_json::from_value(value).map_err(|error| {
                ProviderError::Config(format!("invalid deployment {:?}: {}", key, error))
            })?;
            parsed.push((key, deployment));
        }
        let chosen = match parsed.iter().position(|(_, d)| d.default) {
            Some(index) => parsed.swap_remove(index),
            None if !parsed.is_empty() => parsed.swap_remove(0),
            None => {
                return Err(ProviderError::Config("credentials JSON lists no deployments".into()))
            }
        };
        let (key, deployment) = chosen;
        debug!(deployment = %deployment.name.as_deref().unwrap_or(&key), "selected deployment");
        let token = deployment
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Config(format!("deployment {:?} has no token", key)))?;
        return Ok((token, deployment.url.filter(|u| !u.is_empty())));
    }

    let token = credentials
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ProviderError::Config("credentials JSON has no token".into()))?;
    Ok((token, credentials.url.filter(|u| !u.is_empty())))
}

fn normalise_url(raw: &str) -> ProviderResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|error| {
        ProviderError::Config(format!("invalid workspace URL {:?}: {}", raw, error))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ProviderError::Config(format!(
            "workspace URL {:?} must be http(s) with a host",
            raw
        )));
    }
    if trimmed.ends_with(API_SUFFIX) {
        Ok(trimmed.to_owned())
    } else {
        Ok(format!("{}{}", trimmed, API_SUFFIX))
    }
}

/// Tunables for a [`Provider`](crate::Provider).
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Wall-clock budget for each CRUD call.
    pub operation_timeout: Duration,
    pub resource_poll: PollSettings,
    pub session_poll: PollSettings,
    pub session_delete_poll: PollSettings,
    pub authorization_poll: PollSettings,
    /// Fetch objects on read instead of returning the host's state unchanged.
    pub refresh_on_read: bool,
    /// Bound on each HTTP call; `None` leaves the client default.
    pub request_timeout: Option<Duration>,
    pub sleeper: Arc<dyn Sleeper>,
    pub clock: Arc<dyn Clock>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            resource_poll: PollSettings::resource(),
            session_poll: PollSettings::session(),
            session_delete_poll: PollSettings::session_delete(),
            authorization_poll: PollSettings::authorization(),
            refresh_on_read: false,
            request_timeout: None,
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(MonotonicClock::default()),
        }
    }
}

impl ProviderOptions {
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn with_refresh_on_read(mut self, refresh_on_read: bool) -> Self {
        self.refresh_on_read = refresh_on_read;
        self
    }
}
