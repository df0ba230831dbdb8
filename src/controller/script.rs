use async_trait::async_trait;
use tracing::info;

use super::{Controller, OperationContext, Shared};
use crate::attributes::{AttributeBag, ResourceData};
use crate::client::{Entity, ScriptRequest};
use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, ProviderResult};

/// Cannot change once the script exists.
const IMMUTABLE: &[&str] = &["endpoint"];

/// Scripts are synchronous on the Platform and have no read endpoint.
#[derive(Debug, Clone)]
pub struct ScriptController {
    shared: Shared,
}

impl ScriptController {
    pub fn new(shared: Shared) -> Self {
        Self { shared }
    }
}

fn request(attributes: &AttributeBag) -> ProviderResult<ScriptRequest> {
    Ok(ScriptRequest {
        name: attributes.required_string("name")?,
        command: attributes.string("command")?,
        endpoint: attributes.string("endpoint")?,
    })
}

#[async_trait]
impl Controller for ScriptController {
    fn entity(&self) -> Entity {
        Entity::Script
    }

    async fn create(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let request = request(data.attributes())?;
        let id = self.shared.client.create_script(&request).await?;
        info!(entity = %Entity::Script, id = %id, endpoint = %request.endpoint, "created");
        data.set_id(id);
        Ok(Diagnostics::new())
    }

    async fn read(
        &self,
        _ctx: &OperationContext,
        _data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        Ok(Diagnostics::new())
    }

    async fn update(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        if let Some(attribute) = IMMUTABLE.iter().find(|attribute| data.has_change(attribute)) {
            return Err(ProviderError::ImmutableAttribute { attribute: (*attribute).to_owned() });
        }
        let id = data.require_id()?.to_owned();
        let request = request(data.attributes())?;
        self.shared.client.update_script(&id, &request).await?;
        info!(entity = %Entity::Script, id = %id, "updated");
        Ok(Diagnostics::new())
    }

    async fn delete(
        &self,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        let id = data.require_id()?.to_owned();
        self.shared.client.delete_script(&id).await?;
        data.clear_id();
        info!(entity = %Entity::Script, id = %id, "deleted");
        Ok(Diagnostics::new())
    }
}
