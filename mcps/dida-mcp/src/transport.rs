//! HTTP seam between upstream operations and the network
//!
//! [`HttpTransport`] performs exactly one request/response exchange. The
//! production implementation wraps `reqwest`; tests swap in an in-process fake.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{DidaError, DidaResult};

/// An outbound request to either API generation
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// A fully-read upstream response
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`DidaError::Http`]
    pub fn error_for_status(self) -> DidaResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(DidaError::Http {
                status: self.status,
                status_text: self.status_text,
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> DidaResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Parse the body as JSON, treating an empty body as `null`
    pub fn json_or_null(&self) -> DidaResult<Value> {
        if self.body.trim().is_empty() {
            Ok(Value::Null)
        } else {
            self.json()
        }
    }
}

/// Trait for sending upstream requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> DidaResult<UpstreamResponse>;
}

/// `reqwest`-backed transport
///
/// No timeout is configured: a hanging upstream call hangs the tool call.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> DidaResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: UpstreamRequest) -> DidaResult<UpstreamResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(status = status.as_u16(), "upstream responded");

        Ok(UpstreamResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
