//! Provider entry point: owns the client and the controllers and dispatches host calls.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info_span, Instrument};

use crate::attributes::ResourceData;
use crate::client::{PlatformClient, ReqwestTransport, Transport};
use crate::config::{ProviderConfig, ProviderOptions};
use crate::controller::{
    AuthorizationController, Controller, OperationContext, ResourceController, ScriptController,
    SessionController, Shared, TeamController,
};
use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, ProviderResult};
use crate::poll::StatusPoller;
use crate::timeout::OperationTimeout;

/// Object families exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Resource,
    Authorization,
    Session,
    Script,
    Team,
}

impl ObjectKind {
    pub const ALL: &'static [ObjectKind] =
        &[Self::Resource, Self::Authorization, Self::Session, Self::Script, Self::Team];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Authorization => "authorization",
            Self::Session => "session",
            Self::Script => "script",
            Self::Team => "team",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProviderError::Config(format!("unknown object kind {:?}", s)))
    }
}

#[derive(Debug, Clone, Copy)]
enum Crud {
    Create,
    Read,
    Update,
    Delete,
}

impl Crud {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A configured provider. Cheap to share behind an `Arc`; holds no per-call state.
#[derive(Debug)]
pub struct Provider {
    client: PlatformClient,
    timeout: OperationTimeout,
    resources: ResourceController,
    authorizations: AuthorizationController,
    sessions: SessionController,
    scripts: ScriptController,
    teams: TeamController,
}

impl Provider {
    /// Provider talking to the Platform over HTTPS.
    pub fn new(config: ProviderConfig, options: ProviderOptions) -> ProviderResult<Self> {
        let transport = ReqwestTransport::new(options.request_timeout)?;
        Self::with_transport(config, Arc::new(transport), options)
    }

    /// Provider over a caller-supplied transport.
    pub fn with_transport(
        config: ProviderConfig,
        transport: Arc<dyn Transport>,
        options: ProviderOptions,
    ) -> ProviderResult<Self> {
        let timeout = OperationTimeout::new(options.operation_timeout)?;
        let client = PlatformClient::new(&config, transport);
        let poller = StatusPoller::new(options.sleeper.clone(), options.clock.clone());
        let shared =
            Shared::new(client.clone(), poller).with_refresh_on_read(options.refresh_on_read);

        Ok(Self {
            client,
            timeout,
            resources: ResourceController::new(shared.clone())
                .with_poll_settings(options.resource_poll),
            authorizations: AuthorizationController::new(shared.clone())
                .with_poll_settings(options.authorization_poll),
            sessions: SessionController::new(shared.clone())
                .with_poll_settings(options.session_poll, options.session_delete_poll),
            scripts: ScriptController::new(shared.clone()),
            teams: TeamController::new(shared),
        })
    }

    pub fn client(&self) -> &PlatformClient {
        &self.client
    }

    pub fn controller(&self, kind: ObjectKind) -> &dyn Controller {
        match kind {
            ObjectKind::Resource => &self.resources,
            ObjectKind::Authorization => &self.authorizations,
            ObjectKind::Session => &self.sessions,
            ObjectKind::Script => &self.scripts,
            ObjectKind::Team => &self.teams,
        }
    }

    pub async fn create(
        &self,
        kind: ObjectKind,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        self.dispatch(kind, Crud::Create, ctx, data).await
    }

    pub async fn read(
        &self,
        kind: ObjectKind,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        self.dispatch(kind, Crud::Read, ctx, data).await
    }

    pub async fn update(
        &self,
        kind: ObjectKind,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        self.dispatch(kind, Crud::Update, ctx, data).await
    }

    pub async fn delete(
        &self,
        kind: ObjectKind,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        self.dispatch(kind, Crud::Delete, ctx, data).await
    }

    async fn dispatch(
        &self,
        kind: ObjectKind,
        crud: Crud,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ProviderResult<Diagnostics> {
        if ctx.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        let controller = self.controller(kind);
        let span = info_span!(
            "crud",
            object = %kind,
            op = crud.as_str(),
            id = data.id().unwrap_or_default()
        );
        let call = async {
            match crud {
                Crud::Create => controller.create(ctx, data).await,
                Crud::Read => controller.read(ctx, data).await,
                Crud::Update => controller.update(ctx, data).await,
                Crud::Delete => controller.delete(ctx, data).await,
            }
        };
        self.timeout.run(call.instrument(span)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_kinds_parse_by_name() {
        for kind in ObjectKind::ALL {
            assert_eq!(kind.as_str().parse::<ObjectKind>().unwrap(), *kind);
        }
        assert!("endpoint".parse::<ObjectKind>().is_err());
    }

    #[test]
    fn zero_operation_timeout_is_rejected() {
        let config = ProviderConfig::from_parts("tok", None).unwrap();
        let options = ProviderOptions::default().with_operation_timeout(std::time::Duration::ZERO);
        let transport = Arc::new(crate::testing::PlatformMock::new());
        let err = Provider::with_transport(config, transport, options).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }
}
