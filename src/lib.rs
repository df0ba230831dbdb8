#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # adaptive-provider
//!
//! Lifecycle engine behind an infrastructure-as-code provider for the Adaptive Platform.
//!
//! The Platform creates objects asynchronously (`creating → created | failed`). This crate turns
//! that into synchronous create, read, update and delete calls for the host:
//!
//! - **Integration registry**: one static schema per integration kind, mapping the host's
//!   attribute bag onto the YAML config the Platform expects
//! - **Platform client** with a uniform status-code taxonomy over a pluggable [`Transport`]
//! - **Status poller** built on a bounded [`RetryPolicy`] with injectable sleeper, clock and
//!   cancellation
//! - **Controllers** for resources, authorizations, sessions (including the forced-delete
//!   protocol), scripts and teams
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use adaptive_provider::testing::PlatformMock;
//! use adaptive_provider::{
//!     AttributeBag, InstantSleeper, Method, ObjectKind, OperationContext, Provider,
//!     ProviderConfig, ProviderOptions, ResourceData,
//! };
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let platform = PlatformMock::new();
//! platform.respond(Method::Post, "/terraform/team/create", 200, json!({"id": "t1"}));
//!
//! let config = ProviderConfig::from_parts("svc-token", None)?;
//! let options = ProviderOptions::default().with_sleeper(Arc::new(InstantSleeper));
//! let provider = Provider::with_transport(config, Arc::new(platform), options)?;
//!
//! let mut team = ResourceData::new(
//!     AttributeBag::new().with("name", "ops").with("members", vec!["a@example.com"]),
//! );
//! provider.create(ObjectKind::Team, &OperationContext::new(), &mut team).await?;
//! assert_eq!(team.id(), Some("t1"));
//! # Ok::<(), adaptive_provider::ProviderError>(())
//! # }).unwrap();
//! ```

pub mod attributes;
pub mod client;
pub mod clock;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod poll;
pub mod provider;
pub mod registry;
pub mod retry;
pub mod sleeper;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod timeout;
pub mod validation;

// Re-exports
pub use attributes::{AttrValue, AttributeBag, ResourceData};
pub use tokio_util::sync::CancellationToken;
pub use client::{
    Entity, Method, ObjectState, Operation, PlatformClient, ReqwestTransport, Transport,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ProviderConfig, ProviderOptions};
pub use controller::{Controller, OperationContext};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ProviderError, ProviderResult, RetryError};
pub use logging::{init_logging, try_init_logging};
pub use poll::{PollSettings, StatusPoller};
pub use provider::{ObjectKind, Provider};
pub use registry::{IntegrationConfig, IntegrationKind};
pub use retry::{RetryPolicy, RetryPolicyBuilder};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use timeout::OperationTimeout;
