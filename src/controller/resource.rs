use async_trait::async_trait;
use tracing::{debug, info};

use super::{apply_refresh, Controller, OperationContext, Shared};
use crate::attributes::{AttributeBag, ResourceData};
use crate::client::{CreateResourceRequest, Entity, UpdateResourceRequest};
use crate::diagnostics::Diagnostics;
use crate::error::ProviderResult;
use crate::poll::PollSettings;
use crate::registry::{self, IntegrationKind};

/// Integration resources of every registered kind.
#[derive(Debug, Clone)]
pub struct ResourceController {
    shared: Shared,
    poll: PollSettings,
}

/// Validated resource payload.
struct ResourcePlan {
    kind: IntegrationKind,
    name: String,
    config: String,
    tags: Vec<String>,
    default_cluster: String,
}

impl ResourcePlan {
    fn from_attributes(attributes: &AttributeBag) -> ProviderResult<Self> {
        let kind: IntegrationKind = attributes.string("type")?.parse()?;
        let config = registry::build(kind, attributes)?;
        Ok(Self {
            kind,
            name: attributes.required_string("name")?,
            config: config.to_yaml()?,
            tags: attributes.string_list("tags")?,
            default_cluster: attributes.string("default_cluster")?,
        })
    }
}

impl ResourceController {
    pub fn new(shared: Shared) -> Self {
        Self { shared, poll: PollSettings::resource() }
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }
}

#[async_trait]
impl Controller for ResourceController {
    fn entity(&self) -> Entity {
        Entity::Resource
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let plan = ResourcePlan::from_attributes(data.attributes())?;
        let request = CreateResourceRequest {
            integration_type: plan.kind.wire_name().to_owned(),
            name: plan.name,
            config: plan.config,
            user_tags: plan.tags,
            default_cluster: plan.default_cluster,
        };

        let id = self.shared.client.create_resource(&request).await?;
        data.set_id(id.clone());

        let client = &self.shared.client;
        let id_ref = id.as_str();
        self.shared
            .poller
            .wait_while_creating(
                Entity::Resource,
                &id,
                self.poll,
                ctx.cancel_token(),
                move || client.read_resource(id_ref),
            )
            .await?;
        info!(entity = %Entity::Resource, id = %id, kind = %plan.kind, "ready");
        Ok(Diagnostics::new())
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
        match self.shared.client.read_resource(&id).await {
            Ok(state) => apply_refresh(data, &state, &[("name", "name")]),
            Err(error) if error.is_not_found() => {
                debug!(entity = %Entity::Resource, id = %id, "gone");
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
        let plan = ResourcePlan::from_attributes(data.attributes())?;
        let request = UpdateResourceRequest {
            integration_type: plan.kind.wire_name().to_owned(),
            config: plan.config,
            user_tags: plan.tags,
            default_cluster: plan.default_cluster,
        };
        self.shared.client.update_resource(&id, &plan.name, &request).await?;
        info!(entity = %Entity::Resource, id = %id, "updated");
        Ok(Diagnostics::new())
    }

    async fn delete(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let id = data.require_id()?.to_owned();
        self.shared.client.delete_resource(&id).await?;
        data.clear_id();
        info!(entity = %Entity::Resource, id = %id, "deleted");
        Ok(Diagnostics::new())
    }
}
