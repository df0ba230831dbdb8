//! In-memory Platform for tests.
//!
//! [`PlatformMock`] is a scripted [`Transport`]: each route (method + URL suffix) holds a queue of
//! replies. Replies are consumed in order and the last one repeats, so "creating twice, then
//! created" is three `respond` calls. Every request is logged for later assertions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{HttpRequest, HttpResponse, Method, SessionRequest, Transport};
use crate::error::ProviderError;

#[derive(Debug, Clone)]
enum Reply {
    Response(HttpResponse),
    NetworkError(String),
}

#[derive(Debug)]
struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Reply>,
}

#[derive(Debug, Default)]
struct State {
    routes: Vec<Route>,
    requests: Vec<HttpRequest>,
}

/// Scripted fake Platform. Clones share routes and the request log.
#[derive(Debug, Clone, Default)]
pub struct PlatformMock {
    state: Arc<Mutex<State>>,
}

impl PlatformMock {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        let mut state = self.lock();
        match state.routes.iter_mut().find(|r| r.method == method && r.path == path) {
            Some(route) => route.replies.push_back(reply),
            None => state.routes.push(Route {
                method,
                path: path.to_owned(),
                replies: VecDeque::from([reply]),
            }),
        }
    }

    /// Queue a JSON reply for `method` requests whose URL ends with `path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Reply::Response(HttpResponse::json(status, &body)));
        self
    }

    /// Queue a raw reply.
    pub fn respond_raw(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        self.push(method, path, Reply::Response(response));
        self
    }

    /// Queue a transport failure.
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Reply::NetworkError(message.to_owned()));
        self
    }

    /// Queue `{"Status": status}` answers for a read route, in order.
    pub fn statuses(&self, path: &str, http_status: u16, statuses: &[&str]) -> &Self {
        for status in statuses {
            self.respond(Method::Get, path, http_status, json!({ "Status": status }));
        }
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests matching `method` and URL suffix `path`.
    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.lock().requests.iter().filter(|r| r.method == method && r.url.ends_with(path)).count()
    }

    /// Bodies of requests matching `method` and URL suffix `path`, in order.
    pub fn bodies(&self, method: Method, path: &str) -> Vec<Value> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(path))
            .filter_map(|r| r.body.clone())
            .collect()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }
}

#[async_trait]
impl Transport for PlatformMock {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        let route = state
            .routes
            .iter_mut()
            .find(|r| r.method == request.method && request.url.ends_with(&r.path));
        let reply = match route {
            Some(route) if route.replies.len() > 1 => route.replies.pop_front(),
            Some(route) => route.replies.front().cloned(),
            None => None,
        };

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::NetworkError(message)) => Err(ProviderError::Network(message)),
            None => {
                let reason = format!("no route for {} {}", request.method.as_str(), request.url);
                Ok(HttpResponse::json(404, &json!({ "error": reason })))
            }
        }
    }
}

/// Minimal valid session body.
pub fn session_request(name: &str) -> SessionRequest {
    SessionRequest {
        session_name: name.to_owned(),
        resource_name: String::new(),
        cluster_name: String::new(),
        authorization_name: String::new(),
        session_ttl: String::new(),
        session_type: "cli".to_owned(),
        session_users: Vec::new(),
        is_jit_enabled: false,
        access_approvers: Vec::new(),
        pause_timeout: String::new(),
        idle_timeout: String::new(),
        memory: String::new(),
        cpu: String::new(),
        users_tags: Vec::new(),
        groups: Vec::new(),
        script_only_access: false,
    }
}
