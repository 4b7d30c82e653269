//! In-process transport fake and client builders for tests

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::Value;

use crate::client::DidaClient;
use crate::config::{ConfigStore, Endpoints};
use crate::error::{DidaError, DidaResult};
use crate::headers::DeviceFingerprint;
use crate::session::{Credentials, Session};
use crate::transport::{HttpTransport, UpstreamRequest, UpstreamResponse};

pub const V1: &str = "http://dida.test/open/v1";
pub const V2: &str = "http://dida.test/api/v2";

struct Route {
    method: Method,
    url: String,
    responses: VecDeque<UpstreamResponse>,
    last: Option<UpstreamResponse>,
}

/// Records every request and replays canned responses by method + URL
///
/// Responses queued for a route are consumed in order; once the queue is
/// drained the last served response keeps answering. Unrouted requests fail
/// with a transport error.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON response for `method` on `url`
    pub fn on(&self, method: Method, url: impl Into<String>, status: u16, body: Value) -> &Self {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.on_raw(method, url, status, body)
    }

    pub fn on_raw(
        &self,
        method: Method,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> &Self {
        let url = url.into();
        let response = UpstreamResponse {
            status,
            status_text: status_text(status).to_string(),
            body: body.into(),
        };

        let mut routes = self.routes.lock();
        match routes.iter_mut().find(|r| r.method == method && r.url == url) {
            Some(route) => route.responses.push_back(response),
            None => routes.push(Route {
                method,
                url,
                responses: VecDeque::from([response]),
                last: None,
            }),
        }
        self
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests whose method and URL match
    pub fn requests_to(&self, method: Method, url: &str) -> Vec<UpstreamRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: UpstreamRequest) -> DidaResult<UpstreamResponse> {
        self.requests.lock().push(request.clone());

        let mut routes = self.routes.lock();
        let route = routes
            .iter_mut()
            .find(|r| r.method == request.method && r.url == request.url)
            .ok_or_else(|| {
                DidaError::Transport(format!("no route for {} {}", request.method, request.url))
            })?;

        if let Some(response) = route.responses.pop_front() {
            route.last = Some(response.clone());
            return Ok(response);
        }
        route
            .last
            .clone()
            .ok_or_else(|| DidaError::Transport("route has no response".into()))
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}

pub fn creds(v1: Option<&str>, v2: Option<&str>, inbox: Option<&str>) -> Credentials {
    Credentials {
        v1_token: v1.map(String::from),
        v1_is_oauth: v1.is_some(),
        v2_token: v2.map(String::from),
        inbox_id: inbox.map(String::from),
    }
}

/// Client over `transport` with the given credentials and no config file
pub fn client(transport: Arc<FakeTransport>, credentials: Credentials) -> DidaClient {
    DidaClient::new(
        transport,
        Endpoints::new(V1, V2),
        Arc::new(Session::new(credentials)),
        DeviceFingerprint::process(),
    )
    .with_time_zone("Asia/Shanghai")
}

/// Same as [`client`] but persisting the inbox id to `store`
pub fn client_with_store(
    transport: Arc<FakeTransport>,
    credentials: Credentials,
    store: ConfigStore,
) -> DidaClient {
    client(transport, credentials).with_config_store(store)
}
