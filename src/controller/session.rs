//! Session (endpoint) lifecycle.
//!
//! Delete is a small state machine:
//!
//! ```text
//! delete ─► poll ─┬─ terminal status ─► force delete (200) ─► confirm
//!                 ├─ no status ───────────────────────────────► confirm
//!                 └─ anything else: poll again, up to the budget
//! confirm: terminated | marked-for-deletion | does-not-exist | no status
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{apply_refresh, Controller, OperationContext, Shared, STATUS_DOES_NOT_EXIST};
use crate::attributes::{AttributeBag, ResourceData};
use crate::client::{Entity, ObjectState, SessionRequest};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ProviderError, ProviderResult, RetryError};
use crate::poll::PollSettings;
use crate::validation::{
    self, SessionType, CPU_CHOICES, DEFAULT_CPU, DEFAULT_MEMORY, MEMORY_CHOICES, TIMEOUT_CHOICES,
    TTL_CHOICES,
};

/// Statuses after which the Platform needs a forced delete to reap the session.
const FORCE_DELETE_STATUSES: &[&str] =
    &["terminated", "marked-for-deletion", "failed", "failed-to-restart"];

/// Statuses that confirm a delete.
const DELETED_STATUSES: &[&str] = &["terminated", "marked-for-deletion", STATUS_DOES_NOT_EXIST];

#[derive(Debug, Clone)]
pub struct SessionController {
    shared: Shared,
    create_poll: PollSettings,
    delete_poll: PollSettings,
}

impl SessionController {
    pub fn new(shared: Shared) -> Self {
        Self {
            shared,
            create_poll: PollSettings::session(),
            delete_poll: PollSettings::session_delete(),
        }
    }

    pub fn with_poll_settings(mut self, create: PollSettings, delete: PollSettings) -> Self {
        self.create_poll = create;
        self.delete_poll = delete;
        self
    }

    /// Poll until the session reaches a terminal status or vanishes, forcing deletion when the
    /// Platform leaves it unreaped, then confirm with a final read.
    async fn delete_protocol(&self, ctx: &OperationContext, id: &str) -> ProviderResult<()> {
        let client = &self.shared.client;
        client.delete_session(id).await?;

        let policy = self.shared.poller.policy(self.delete_poll, ctx.cancel_token(), |state| {
            state.status().is_some()
                && !status_in(state, FORCE_DELETE_STATUSES)
                && !state.status_is(STATUS_DOES_NOT_EXIST)
        })?;

        match policy.execute(move || client.read_session(id)).await {
            Ok(state) if status_in(&state, FORCE_DELETE_STATUSES) => {
                let status = state.status().unwrap_or_default();
                info!(entity = %Entity::Session, id, status, "escalating to force delete");
                client.force_delete_session(id).await?;
            }
            Ok(_) => debug!(entity = %Entity::Session, id, "session gone after delete"),
            Err(RetryError::Inner(error)) => return Err(error),
            Err(RetryError::Cancelled { .. }) => return Err(ProviderError::Cancelled),
            Err(
                error @ (RetryError::MaxRetriesReached { .. } | RetryError::Timeout { .. }),
            ) => {
                return Err(ProviderError::DeleteFailed {
                    id: id.to_owned(),
                    reason: format!(
                        "session did not reach a terminal status after {} checks",
                        error.attempts().unwrap_or_default()
                    ),
                });
            }
        }

        let state = client.read_session(id).await?;
        if state.status().is_none() || status_in(&state, DELETED_STATUSES) {
            Ok(())
        } else {
            Err(ProviderError::DeleteFailed {
                id: id.to_owned(),
                reason: format!(
                    "session reported status {:?} after delete",
                    state.status().unwrap_or_default()
                ),
            })
        }
    }
}

fn status_in(state: &ObjectState, statuses: &[&str]) -> bool {
    statuses.iter().any(|status| state.status_is(status))
}

fn enum_attribute(
    attributes: &AttributeBag,
    key: &str,
    allowed: &[&str],
) -> ProviderResult<String> {
    let value = attributes.string(key)?;
    validation::choice(key, &value, allowed)?;
    Ok(value)
}

fn list_attribute(attributes: &AttributeBag, key: &str) -> ProviderResult<Vec<String>> {
    let values = attributes.string_list(key)?;
    validation::non_empty_entries(key, &values)?;
    Ok(values)
}

/// Validate every enumerated attribute and build the wire body.
fn request(attributes: &AttributeBag) -> ProviderResult<SessionRequest> {
    let session_ttl = enum_attribute(attributes, "ttl", TTL_CHOICES)?;
    let session_type = SessionType::canonicalise(&attributes.string("type")?)?;
    let pause_timeout = enum_attribute(attributes, "pause_timeout", TIMEOUT_CHOICES)?;
    let idle_timeout = enum_attribute(attributes, "idle_timeout", TIMEOUT_CHOICES)?;

    let memory = attributes.string_or("memory", DEFAULT_MEMORY)?;
    validation::choice("memory", &memory, MEMORY_CHOICES)?;
    let cpu = attributes.string_or("cpu", DEFAULT_CPU)?;
    validation::choice("cpu", &cpu, CPU_CHOICES)?;

    Ok(SessionRequest {
        session_name: attributes.required_string("name")?,
        resource_name: attributes.string("resource")?,
        cluster_name: attributes.string("cluster")?,
        authorization_name: attributes.string("authorization")?,
        session_ttl,
        session_type: session_type.as_str().to_owned(),
        session_users: list_attribute(attributes, "users")?,
        is_jit_enabled: attributes.bool("is_jit_enabled")?,
        access_approvers: list_attribute(attributes, "access_approvers")?,
        pause_timeout,
        idle_timeout,
        memory,
        cpu,
        users_tags: attributes.string_list("tags")?,
        groups: list_attribute(attributes, "groups")?,
        script_only_access: attributes.bool("script_only_access")?,
    })
}

#[async_trait]
impl Controller for SessionController {
    fn entity(&self) -> Entity {
        Entity::Session
    }

    /// A failed post-create wait is downgraded to a warning: the id is kept and the host may
    /// retry.
    async fn create(
        &self,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let request = request(data.attributes())?;
        let id = self.shared.client.create_session(&request).await?;
        data.set_id(id.clone());

        let client = &self.shared.client;
        let id_ref = id.as_str();
        let waited = self
            .shared
            .poller
            .wait_while_creating(
                Entity::Session,
                &id,
                self.create_poll,
                ctx.cancel_token(),
                move || client.read_session(id_ref),
            )
            .await;

        let mut diagnostics = Diagnostics::new();
        match waited {
            Ok(_) => info!(entity = %Entity::Session, id = %id, "ready"),
            Err(error) => {
                warn!(entity = %Entity::Session, id = %id, error = %error, "session not ready");
                diagnostics.push(Diagnostic::warning(
                    "Session created but not ready",
                    format!("session {} was created but did not become ready: {}", id, error),
                ));
            }
        }
        Ok(diagnostics)
    }

    async fn read(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        if !self.shared.refresh_on_read {
            return Ok(Diagnostics::new());
        }
        let id = data.require_id()?.to_owned();
        let state = self.shared.client.read_session(&id).await?;
        if state.status().is_none() {
            debug!(entity = %Entity::Session, id = %id, "gone");
            data.clear_id();
        } else {
            apply_refresh(data, &state, &[]);
        }
        Ok(Diagnostics::new())
    }

    async fn update(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let id = data.require_id()?.to_owned();
        let request = request(data.attributes())?;
        self.shared.client.update_session(&id, &request).await?;
        info!(entity = %Entity::Session, id = %id, "updated");
        Ok(Diagnostics::new())
    }

    async fn delete(
        &self,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let id = data.require_id()?.to_owned();
        self.delete_protocol(ctx, &id).await?;
        data.clear_id();
        info!(entity = %Entity::Session, id = %id, "deleted");
        Ok(Diagnostics::new())
    }
}
