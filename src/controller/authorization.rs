use async_trait::async_trait;
use tracing::{debug, info};

use super::{apply_refresh, Controller, OperationContext, Shared};
use crate::attributes::{AttributeBag, ResourceData};
use crate::client::{AuthorizationRequest, Entity};
use crate::diagnostics::Diagnostics;
use crate::error::ProviderResult;
use crate::poll::PollSettings;
use crate::validation::{self, AUTHORIZATION_RESOURCE_TYPES};

/// Response keys copied back on read.
const REFRESHED: &[(&str, &str)] = &[
    ("name", "name"),
    ("description", "description"),
    ("permissions", "permissions"),
    ("resource_type", "resource_type"),
];

/// Authorizations bind a permission set to a resource type.
///
/// Read always refreshes from the Platform, whatever the provider's refresh setting.
#[derive(Debug, Clone)]
pub struct AuthorizationController {
    shared: Shared,
    poll: PollSettings,
}

impl AuthorizationController {
    pub fn new(shared: Shared) -> Self {
        Self { shared, poll: PollSettings::authorization() }
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }
}

fn request(attributes: &AttributeBag) -> ProviderResult<AuthorizationRequest> {
    let resource_type = attributes.string("resource_type")?;
    validation::choice("resource_type", &resource_type, AUTHORIZATION_RESOURCE_TYPES)?;
    Ok(AuthorizationRequest {
        name: attributes.required_string("name")?,
        resource_type,
        description: attributes.string("description")?,
        permissions: attributes.string("permissions")?,
    })
}

#[async_trait]
impl Controller for AuthorizationController {
    fn entity(&self) -> Entity {
        Entity::Authorization
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let request = request(data.attributes())?;
        let id = self.shared.client.create_authorization(&request).await?;
        data.set_id(id.clone());

        let client = &self.shared.client;
        let id_ref = id.as_str();
        self.shared
            .poller
            .wait_while_creating(
                Entity::Authorization,
                &id,
                self.poll,
                ctx.cancel_token(),
                move || client.read_authorization(id_ref),
            )
            .await?;
        info!(entity = %Entity::Authorization, id = %id, "ready");
        Ok(Diagnostics::new())
    }

    async fn read(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let id = data.require_id()?.to_owned();
        match self.shared.client.read_authorization(&id).await {
            Ok(state) => apply_refresh(data, &state, REFRESHED),
            Err(error) if error.is_not_found() => {
                debug!(entity = %Entity::Authorization, id = %id, "gone");
                data.clear_id();
            }
            Err(error) => return Err(error),
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
        self.shared.client.update_authorization(&id, &request).await?;
        info!(entity = %Entity::Authorization, id = %id, "updated");
        Ok(Diagnostics::new())
    }

    async fn delete(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let id = data.require_id()?.to_owned();
        self.shared.client.delete_authorization(&id).await?;
        data.clear_id();
        info!(entity = %Entity::Authorization, id = %id, "deleted");
        Ok(Diagnostics::new())
    }
}
