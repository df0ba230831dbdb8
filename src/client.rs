//! Typed client for the Platform's provider API.
//!
//! Every request goes to `<workspace>/terraform/<entity>/...` (the workspace URL already ends in
//! `/api/v1`) and carries the service token in the `Authorization` header. Responses are
//! classified uniformly:
//!
//! - accepted status → decode the body;
//! - `401` → [`ProviderError::AuthenticationFailed`];
//! - `409` → [`ProviderError::DuplicateName`] with the requested name;
//! - anything else → [`ProviderError::Platform`] carrying the `{error}` reason when present.

/// JSON bodies.
pub mod envelopes;
/// HTTP seam.
pub mod transport;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};

pub use envelopes::{
    AuthorizationRequest, CreateResourceRequest, CreatedResponse, ErrorResponse, ObjectState,
    ScriptRequest, SessionRequest, TeamRequest, UpdateResourceRequest,
};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};

/// Object families the Platform manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Resource,
    Session,
    Authorization,
    Team,
    Script,
}

impl Entity {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Session => "session",
            Self::Authorization => "authorization",
            Self::Team => "team",
            Self::Script => "script",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    ForceDelete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::ForceDelete => "force-delete",
        })
    }
}

const OK: &[u16] = &[200];
const OK_OR_ACCEPTED: &[u16] = &[200, 202];
const ACCEPTED: &[u16] = &[202];
const WRITE_ACCEPTED: &[u16] = &[200, 201, 202, 204];

/// Client bound to one workspace and service token. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    token: String,
}

impl PlatformClient {
    pub fn new(config: &ProviderConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: config.workspace_url().trim_end_matches('/').to_owned(),
            token: config.token().to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, entity: Entity, action: Option<&str>, id: Option<&str>) -> String {
        let mut url = format!("{}/terraform/{}", self.base_url, entity.path());
        for segment in [action, id].into_iter().flatten() {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> ProviderResult<HttpResponse> {
        let request = HttpRequest { method, url, authorization: self.token.clone(), body };
        self.transport.send(request).await
    }

    async fn get(&self, url: String) -> ProviderResult<HttpResponse> {
        self.send(Method::Get, url, None).await
    }

    async fn post<B: Serialize>(&self, url: String, body: &B) -> ProviderResult<HttpResponse> {
        let body = serde_json::to_value(body)?;
        self.send(Method::Post, url, Some(body)).await
    }

    /// Bodiless `POST`, used by the delete endpoints.
    async fn post_empty(&self, url: String) -> ProviderResult<HttpResponse> {
        self.send(Method::Post, url, None).await
    }

    // ---- resources -------------------------------------------------------------------------

    pub async fn create_resource(&self, request: &CreateResourceRequest) -> ProviderResult<String> {
        let url = self.url(Entity::Resource, Some("create"), None);
        let response = self.post(url, request).await?;
        let name = Some(request.name.as_str());
        let created: CreatedResponse =
            accept(Entity::Resource, Operation::Create, name, response, WRITE_ACCEPTED)?;
        info!(
            entity = %Entity::Resource,
            id = %created.id,
            kind = %request.integration_type,
            "created"
        );
        Ok(created.id)
    }

    /// Resource reads are only accepted with `202`.
    pub async fn read_resource(&self, id: &str) -> ProviderResult<ObjectState> {
        let response = self.get(self.url(Entity::Resource, Some("read"), Some(id))).await?;
        accept(Entity::Resource, Operation::Read, None, response, ACCEPTED)
    }

    pub async fn update_resource(
        &self,
        id: &str,
        name: &str,
        request: &UpdateResourceRequest,
    ) -> ProviderResult<()> {
        let url = self.url(Entity::Resource, Some("update"), Some(id));
        let response = self.post(url, request).await?;
        accept_empty(Entity::Resource, Operation::Update, Some(name), response, WRITE_ACCEPTED)
    }

    pub async fn delete_resource(&self, id: &str) -> ProviderResult<()> {
        let response = self.post_empty(self.url(Entity::Resource, Some("delete"), Some(id))).await?;
        accept_empty(Entity::Resource, Operation::Delete, None, response, WRITE_ACCEPTED)
    }

    // ---- sessions --------------------------------------------------------------------------

    pub async fn create_session(&self, request: &SessionRequest) -> ProviderResult<String> {
        let response = self.post(self.url(Entity::Session, Some("create"), None), request).await?;
        let name = Some(request.session_name.as_str());
        let created: CreatedResponse =
            accept(Entity::Session, Operation::Create, name, response, WRITE_ACCEPTED)?;
        info!(entity = %Entity::Session, id = %created.id, "created");
        Ok(created.id)
    }

    /// A `404` maps to a state without `Status`: the session is gone.
    pub async fn read_session(&self, id: &str) -> ProviderResult<ObjectState> {
        let response = self.get(self.url(Entity::Session, Some("read"), Some(id))).await?;
        if response.status == 404 {
            debug!(entity = %Entity::Session, id, "read returned 404");
            return Ok(ObjectState::missing());
        }
        accept(Entity::Session, Operation::Read, None, response, OK_OR_ACCEPTED)
    }

    pub async fn update_session(&self, id: &str, request: &SessionRequest) -> ProviderResult<()> {
        let url = self.url(Entity::Session, Some("update"), Some(id));
        let response = self.post(url, request).await?;
        let name = Some(request.session_name.as_str());
        accept_empty(Entity::Session, Operation::Update, name, response, WRITE_ACCEPTED)
    }

    pub async fn delete_session(&self, id: &str) -> ProviderResult<()> {
        let response = self.post_empty(self.url(Entity::Session, Some("delete"), Some(id))).await?;
        accept_empty(Entity::Session, Operation::Delete, None, response, WRITE_ACCEPTED)
    }

    /// Force deletion only succeeds on `200`.
    pub async fn force_delete_session(&self, id: &str) -> ProviderResult<()> {
        let url = self.url(Entity::Session, Some("forcedelete"), Some(id));
        let response = self.post_empty(url).await?;
        accept_empty(Entity::Session, Operation::ForceDelete, None, response, OK)
    }

    // ---- authorizations --------------------------------------------------------------------

    pub async fn create_authorization(
        &self,
        request: &AuthorizationRequest,
    ) -> ProviderResult<String> {
        let url = self.url(Entity::Authorization, Some("create"), None);
        let response = self.post(url, request).await?;
        let name = Some(request.name.as_str());
        let created: CreatedResponse =
            accept(Entity::Authorization, Operation::Create, name, response, WRITE_ACCEPTED)?;
        info!(entity = %Entity::Authorization, id = %created.id, "created");
        Ok(created.id)
    }

    pub async fn read_authorization(&self, id: &str) -> ProviderResult<ObjectState> {
        let response = self.get(self.url(Entity::Authorization, Some("read"), Some(id))).await?;
        accept(Entity::Authorization, Operation::Read, None, response, OK_OR_ACCEPTED)
    }

    pub async fn update_authorization(
        &self,
        id: &str,
        request: &AuthorizationRequest,
    ) -> ProviderResult<()> {
        let url = self.url(Entity::Authorization, Some("update"), Some(id));
        let response = self.post(url, request).await?;
        let name = Some(request.name.as_str());
        accept_empty(Entity::Authorization, Operation::Update, name, response, WRITE_ACCEPTED)
    }

    pub async fn delete_authorization(&self, id: &str) -> ProviderResult<()> {
        let url = self.url(Entity::Authorization, Some("delete"), Some(id));
        let response = self.post_empty(url).await?;
        accept_empty(Entity::Authorization, Operation::Delete, None, response, WRITE_ACCEPTED)
    }

    // ---- teams -----------------------------------------------------------------------------

    pub async fn create_team(&self, request: &TeamRequest) -> ProviderResult<String> {
        let response = self.post(self.url(Entity::Team, Some("create"), None), request).await?;
        let name = Some(request.name.as_str());
        let created: CreatedResponse =
            accept(Entity::Team, Operation::Create, name, response, WRITE_ACCEPTED)?;
        info!(entity = %Entity::Team, id = %created.id, "created");
        Ok(created.id)
    }

    /// Teams are read from `GET /team/{id}`.
    pub async fn read_team(&self, id: &str) -> ProviderResult<ObjectState> {
        let response = self.get(self.url(Entity::Team, None, Some(id))).await?;
        accept(Entity::Team, Operation::Read, None, response, OK_OR_ACCEPTED)
    }

    pub async fn update_team(&self, id: &str, request: &TeamRequest) -> ProviderResult<()> {
        let response = self.post(self.url(Entity::Team, Some("update"), Some(id)), request).await?;
        let name = Some(request.name.as_str());
        accept_empty(Entity::Team, Operation::Update, name, response, WRITE_ACCEPTED)
    }

    pub async fn delete_team(&self, id: &str) -> ProviderResult<()> {
        let response = self.post_empty(self.url(Entity::Team, Some("delete"), Some(id))).await?;
        accept_empty(Entity::Team, Operation::Delete, None, response, WRITE_ACCEPTED)
    }

    // ---- scripts ---------------------------------------------------------------------------

    pub async fn create_script(&self, request: &ScriptRequest) -> ProviderResult<String> {
        let response = self.post(self.url(Entity::Script, Some("create"), None), request).await?;
        let name = Some(request.name.as_str());
        let created: CreatedResponse =
            accept(Entity::Script, Operation::Create, name, response, WRITE_ACCEPTED)?;
        info!(entity = %Entity::Script, id = %created.id, "created");
        Ok(created.id)
    }

    pub async fn update_script(&self, id: &str, request: &ScriptRequest) -> ProviderResult<()> {
        let url = self.url(Entity::Script, Some("update"), Some(id));
        let response = self.post(url, request).await?;
        let name = Some(request.name.as_str());
        accept_empty(Entity::Script, Operation::Update, name, response, WRITE_ACCEPTED)
    }

    pub async fn delete_script(&self, id: &str) -> ProviderResult<()> {
        let response = self.post_empty(self.url(Entity::Script, Some("delete"), Some(id))).await?;
        accept_empty(Entity::Script, Operation::Delete, None, response, WRITE_ACCEPTED)
    }
}

/// Apply the status taxonomy and decode the body.
fn accept<T: DeserializeOwned>(
    entity: Entity,
    operation: Operation,
    name: Option<&str>,
    response: HttpResponse,
    accepted: &[u16],
) -> ProviderResult<T> {
    let response = classify(entity, operation, name, response, accepted)?;
    serde_json::from_slice(&response.body).map_err(|error| {
        ProviderError::Decode(format!("{} {} response: {}", entity, operation, error))
    })
}

/// Apply the status taxonomy and ignore the body.
fn accept_empty(
    entity: Entity,
    operation: Operation,
    name: Option<&str>,
    response: HttpResponse,
    accepted: &[u16],
) -> ProviderResult<()> {
    classify(entity, operation, name, response, accepted).map(|_| ())
}

fn classify(
    entity: Entity,
    operation: Operation,
    name: Option<&str>,
    response: HttpResponse,
    accepted: &[u16],
) -> ProviderResult<HttpResponse> {
    match response.status {
        status if accepted.contains(&status) => Ok(response),
        401 => Err(ProviderError::AuthenticationFailed),
        409 => Err(ProviderError::DuplicateName { name: name.unwrap_or_default().to_owned() }),
        status => {
            let reason = match serde_json::from_slice::<ErrorResponse>(&response.body) {
                Ok(envelope) => envelope.error,
                Err(_) if response.body.is_empty() => format!("unexpected status {}", status),
                Err(_) => response.text(),
            };
            Err(ProviderError::Platform { entity, operation, status, reason })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PlatformMock;
    use serde_json::json;

    fn client(mock: &PlatformMock) -> PlatformClient {
        let config = ProviderConfig::from_parts("svc-token", Some("https://acme.example")).unwrap();
        PlatformClient::new(&config, Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn requests_carry_token_and_workspace_paths() {
        let mock = PlatformMock::new();
        mock.respond(Method::Post, "/terraform/team/create", 200, json!({"id": "t1"}));
        let client = client(&mock);

        let id = client
            .create_team(&TeamRequest { name: "ops".into(), members: vec![], endpoints: vec![] })
            .await
            .unwrap();

        assert_eq!(id, "t1");
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://acme.example/api/v1/terraform/team/create");
        assert_eq!(requests[0].authorization, "svc-token");
        assert_eq!(requests[0].body, Some(json!({"name": "ops", "members": [], "endpoints": []})));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let mock = PlatformMock::new();
        let path = "/terraform/authorization/read/a1";
        mock.respond(Method::Get, path, 401, json!({"error": "bad token"}));
        let err = client(&mock).read_authorization("a1").await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn conflict_maps_to_duplicate_name() {
        let mock = PlatformMock::new();
        mock.respond(Method::Post, "/terraform/script/create", 409, json!({"error": "exists"}));
        let err = client(&mock)
            .create_script(&ScriptRequest {
                name: "backup".into(),
                command: "pg_dump".into(),
                endpoint: "s1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::DuplicateName { ref name } if name == "backup"));
    }

    #[tokio::test]
    async fn other_failures_surface_the_platform_reason() {
        let mock = PlatformMock::new();
        let path = "/terraform/resource/delete/r1";
        mock.respond(Method::Post, path, 500, json!({"error": "in use"}));
        let err = client(&mock).delete_resource("r1").await.unwrap_err();
        match err {
            ProviderError::Platform { entity, operation, status, reason } => {
                assert_eq!(entity, Entity::Resource);
                assert_eq!(operation, Operation::Delete);
                assert_eq!(status, 500);
                assert_eq!(reason, "in use");
            }
            e => panic!("expected Platform, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn resource_read_requires_accepted() {
        let mock = PlatformMock::new();
        mock.respond(Method::Get, "/terraform/resource/read/r1", 200, json!({"Status": "created"}));
        let err = client(&mock).read_resource("r1").await.unwrap_err();
        assert!(matches!(err, ProviderError::Platform { status: 200, .. }));

        mock.respond(Method::Get, "/terraform/resource/read/r2", 202, json!({"Status": "created"}));
        assert!(client(&mock).read_resource("r2").await.unwrap().status_is("created"));
    }

    #[tokio::test]
    async fn authorization_read_accepts_ok_and_accepted() {
        let mock = PlatformMock::new();
        let path = "/terraform/authorization/read/a1";
        mock.respond(Method::Get, path, 200, json!({"Status": "created"}));
        mock.respond(Method::Get, path, 202, json!({"Status": "creating"}));
        let client = client(&mock);
        assert!(client.read_authorization("a1").await.unwrap().status_is("created"));
        assert!(client.read_authorization("a1").await.unwrap().status_is("creating"));
    }

    #[tokio::test]
    async fn session_read_404_is_missing_status() {
        let mock = PlatformMock::new();
        mock.respond(Method::Get, "/terraform/session/read/s1", 404, json!({"error": "not found"}));
        let state = client(&mock).read_session("s1").await.unwrap();
        assert_eq!(state.status(), None);
    }

    #[tokio::test]
    async fn force_delete_requires_ok() {
        let mock = PlatformMock::new();
        mock.respond(Method::Post, "/terraform/session/forcedelete/s1", 202, json!({}));
        let err = client(&mock).force_delete_session("s1").await.unwrap_err();
        assert!(matches!(err, ProviderError::Platform { operation: Operation::ForceDelete, .. }));
    }

    #[tokio::test]
    async fn team_reads_use_bare_id_path() {
        let mock = PlatformMock::new();
        mock.respond(Method::Get, "/terraform/team/t1", 200, json!({"name": "ops"}));
        let state = client(&mock).read_team("t1").await.unwrap();
        assert_eq!(state.field_str("name"), Some("ops"));
    }

    #[tokio::test]
    async fn undecodable_create_response_is_a_decode_error() {
        let mock = PlatformMock::new();
        mock.respond_raw(Method::Post, "/terraform/session/create", HttpResponse::new(200, "oops"));
        let err = client(&mock)
            .create_session(&crate::testing::session_request("s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}
