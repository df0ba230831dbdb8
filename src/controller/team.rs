use async_trait::async_trait;
use tracing::{debug, info};

use super::{apply_refresh, Controller, OperationContext, Shared};
use crate::attributes::{AttributeBag, ResourceData};
use crate::client::{Entity, TeamRequest};
use crate::diagnostics::Diagnostics;
use crate::error::ProviderResult;
use crate::validation;

const REFRESHED: &[(&str, &str)] =
    &[("name", "name"), ("members", "members"), ("endpoints", "endpoints")];

/// Teams are synchronous: no status poll after create.
#[derive(Debug, Clone)]
pub struct TeamController {
    shared: Shared,
}

impl TeamController {
    pub fn new(shared: Shared) -> Self {
        Self { shared }
    }
}

fn request(attributes: &AttributeBag) -> ProviderResult<TeamRequest> {
    let members = attributes.string_list("members")?;
    validation::non_empty_entries("members", &members)?;
    let endpoints = attributes.string_list("endpoints")?;
    validation::non_empty_entries("endpoints", &endpoints)?;
    Ok(TeamRequest { name: attributes.required_string("name")?, members, endpoints })
}

#[async_trait]
impl Controller for TeamController {
    fn entity(&self) -> Entity {
        Entity::Team
    }

    async fn create(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let request = request(data.attributes())?;
        let id = self.shared.client.create_team(&request).await?;
        info!(entity = %Entity::Team, id = %id, members = request.members.len(), "created");
        data.set_id(id);
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
        match self.shared.client.read_team(&id).await {
            Ok(state) => apply_refresh(data, &state, REFRESHED),
            Err(error) if error.is_not_found() => {
                debug!(entity = %Entity::Team, id = %id, "gone");
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
        self.shared.client.update_team(&id, &request).await?;
        info!(entity = %Entity::Team, id = %id, "updated");
        Ok(Diagnostics::new())
    }

    async fn delete(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let id = data.require_id()?.to_owned();
        self.shared.client.delete_team(&id).await?;
        data.clear_id();
        info!(entity = %Entity::Team, id = %id, "deleted");
        Ok(Diagnostics::new())
    }
}
