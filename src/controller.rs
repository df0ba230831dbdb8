//! Lifecycle controllers.
//!
//! One controller per Platform object family. Each turns a host CRUD call into client requests
//! and, where the Platform is asynchronous, a status poll.

pub mod authorization;
pub mod resource;
pub mod script;
pub mod session;
pub mod team;

pub use authorization::AuthorizationController;
pub use resource::ResourceController;
pub use script::ScriptController;
pub use session::SessionController;
pub use team::TeamController;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::attributes::{AttrValue, ResourceData};
use crate::client::{Entity, ObjectState, PlatformClient};
use crate::diagnostics::Diagnostics;
use crate::error::ProviderResult;
use crate::poll::StatusPoller;

/// Attribute that receives the Platform's `Status` on refresh.
pub const STATUS_ATTRIBUTE: &str = "status";

/// Status the Platform reports for objects it has already removed.
pub const STATUS_DOES_NOT_EXIST: &str = "does-not-exist";

/// Per-call context handed down from the host.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    cancel: CancellationToken,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Create, read, update and delete for one object family.
///
/// `create` records the id on `data` as soon as the Platform assigns it, so a failure after
/// that point still leaves the host with a handle on the partially created object. `delete`
/// clears the id on success.
#[async_trait]
pub trait Controller: Send + Sync + std::fmt::Debug {
    fn entity(&self) -> Entity;

    async fn create(
        &self,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics>;

    async fn read(
        &self,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics>;

    async fn update(
        &self,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics>;

    async fn delete(
        &self,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics>;
}

/// State every controller shares.
#[derive(Debug, Clone)]
pub struct Shared {
    pub client: PlatformClient,
    pub poller: StatusPoller,
    /// Whether `read` fetches the object instead of returning the host's state unchanged.
    pub refresh_on_read: bool,
}

impl Shared {
    pub fn new(client: PlatformClient, poller: StatusPoller) -> Self {
        Self { client, poller, refresh_on_read: false }
    }

    pub fn with_refresh_on_read(mut self, refresh_on_read: bool) -> Self {
        self.refresh_on_read = refresh_on_read;
        self
    }
}

/// Copy a read response into the host's attributes.
///
/// `fields` maps response keys to attribute names; keys absent from the response leave the
/// attribute untouched. An object reported as `does-not-exist` loses its id.
pub(crate) fn apply_refresh(data: &mut ResourceData, state: &ObjectState, fields: &[(&str, &str)]) {
    if state.status_is(STATUS_DOES_NOT_EXIST) {
        data.clear_id();
        return;
    }
    if let Some(status) = state.status() {
        data.attributes_mut().insert(STATUS_ATTRIBUTE, status);
    }
    for (key, attribute) in fields {
        if let Some(value) = state.field(key).and_then(attr_value) {
            data.attributes_mut().insert(*attribute, value);
        }
    }
}

fn attr_value(value: &Value) -> Option<AttrValue> {
    match value {
        Value::Bool(b) => Some(AttrValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(AttrValue::Number),
        Value::String(s) => Some(AttrValue::String(s.clone())),
        Value::Array(items) => {
            items.iter().map(attr_value).collect::<Option<Vec<_>>>().map(AttrValue::List)
        }
        Value::Null | Value::Object(_) => None,
    }
}
