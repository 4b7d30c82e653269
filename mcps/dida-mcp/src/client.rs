//! Upstream client operations
//!
//! One method per upstream capability. Every method builds its headers from
//! the current session before touching the network, so a missing credential
//! fails with [`DidaError::AuthAbsent`] and no request is sent.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ConfigStore, Endpoints, DEFAULT_TIME_ZONE};
use crate::error::{DidaError, DidaResult};
use crate::headers::{self, DeviceFingerprint};
use crate::session::Session;
use crate::transport::{HttpTransport, UpstreamRequest, UpstreamResponse};
use crate::types::{
    BatchCheck, BatchResult, NewProject, NewTask, ProjectProfile, TaskLookup, TaskMove,
};

/// Shared handle used by every tool handler
#[derive(Clone)]
pub struct DidaClient {
    transport: Arc<dyn HttpTransport>,
    endpoints: Endpoints,
    session: Arc<Session>,
    fingerprint: &'static DeviceFingerprint,
    time_zone: String,
    config_store: Option<ConfigStore>,
}

impl DidaClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        endpoints: Endpoints,
        session: Arc<Session>,
        fingerprint: &'static DeviceFingerprint,
    ) -> Self {
        Self {
            transport,
            endpoints,
            session,
            fingerprint,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            config_store: None,
        }
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    /// Persist discovered inbox ids through `store`
    pub fn with_config_store(mut self, store: ConfigStore) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    pub fn config_store(&self) -> Option<&ConfigStore> {
        self.config_store.as_ref()
    }

    /// Fail early unless the v1 token is present
    pub fn require_v1(&self) -> DidaResult<()> {
        headers::v1_headers(&self.session.credentials()).map(|_| ())
    }

    /// Fail early unless the v2 token is present
    pub fn require_v2(&self) -> DidaResult<()> {
        headers::v2_headers(self.fingerprint, &self.session.credentials()).map(|_| ())
    }

    /// Explicit project id, or the cached inbox id when none is given
    pub fn resolve_project(&self, project_id: Option<String>) -> DidaResult<String> {
        match project_id.filter(|id| !id.is_empty()) {
            Some(id) => Ok(id),
            None => self.session.inbox_id().ok_or(DidaError::MissingInbox),
        }
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    async fn send(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Option<Value>,
    ) -> DidaResult<UpstreamResponse> {
        debug!(%method, %url, "upstream request");
        let response = self
            .transport
            .send(UpstreamRequest {
                method: method.clone(),
                url: url.clone(),
                headers,
                body,
            })
            .await?;

        if !response.is_success() {
            warn!(%method, %url, status = response.status, "upstream request failed");
        }
        response.error_for_status()
    }

    async fn v1<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> DidaResult<UpstreamResponse> {
        let headers = headers::v1_headers(&self.session.credentials())?;
        let body = body.map(serde_json::to_value).transpose()?;
        self.send(method, self.endpoints.v1_url(path), headers, body)
            .await
    }

    async fn v2<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> DidaResult<UpstreamResponse> {
        let headers = headers::v2_headers(self.fingerprint, &self.session.credentials())?;
        let body = body.map(serde_json::to_value).transpose()?;
        self.send(method, self.endpoints.v2_url(path), headers, body)
            .await
    }

    // ========================================================================
    // Projects (v1)
    // ========================================================================

    pub async fn list_projects(&self) -> DidaResult<Vec<Value>> {
        self.v1::<()>(Method::GET, "/project", None).await?.json()
    }

    /// Same call as [`Self::list_projects`], typed for cache population
    pub async fn list_project_profiles(&self) -> DidaResult<Vec<ProjectProfile>> {
        self.v1::<()>(Method::GET, "/project", None).await?.json()
    }

    pub async fn create_project(&self, project: &NewProject) -> DidaResult<Value> {
        self.v1(Method::POST, "/project", Some(project))
            .await?
            .json_or_null()
    }

    pub async fn update_project(&self, project_id: &str, changes: &Value) -> DidaResult<Value> {
        self.v1(Method::POST, &format!("/project/{}", project_id), Some(changes))
            .await?
            .json_or_null()
    }

    pub async fn delete_project(&self, project_id: &str) -> DidaResult<()> {
        self.v1::<()>(Method::DELETE, &format!("/project/{}", project_id), None)
            .await?;
        Ok(())
    }

    /// Project with its tasks and columns
    pub async fn project_data(&self, project_id: &str) -> DidaResult<Value> {
        self.v1::<()>(Method::GET, &format!("/project/{}/data", project_id), None)
            .await?
            .json()
    }

    // ========================================================================
    // Tasks (v1)
    // ========================================================================

    pub async fn create_task(&self, task: &NewTask) -> DidaResult<Value> {
        self.v1(Method::POST, "/task", Some(task)).await?.json_or_null()
    }

    pub async fn get_task(&self, project_id: &str, task_id: &str) -> DidaResult<Value> {
        self.v1::<()>(
            Method::GET,
            &format!("/project/{}/task/{}", project_id, task_id),
            None,
        )
        .await?
        .json()
    }

    pub async fn update_task(&self, task_id: &str, task: &Value) -> DidaResult<Value> {
        self.v1(Method::POST, &format!("/task/{}", task_id), Some(task))
            .await?
            .json_or_null()
    }

    pub async fn delete_task(&self, project_id: &str, task_id: &str) -> DidaResult<()> {
        self.v1::<()>(
            Method::DELETE,
            &format!("/project/{}/task/{}", project_id, task_id),
            None,
        )
        .await?;
        Ok(())
    }

    /// Mark a task complete; fails on a per-id error in the response body
    pub async fn complete_task(&self, project_id: &str, task_id: &str) -> DidaResult<()> {
        let body = self
            .v1::<()>(
                Method::POST,
                &format!("/project/{}/task/{}/complete", project_id, task_id),
                None,
            )
            .await?
            .json_or_null()?;

        if let Some(err) = body.get("id2error").and_then(|m| m.get(task_id)) {
            let mut id2error = std::collections::BTreeMap::new();
            let reason = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
            id2error.insert(task_id.to_string(), reason);
            return Err(DidaError::Partial { id2error });
        }
        Ok(())
    }

    // ========================================================================
    // v2 web API
    // ========================================================================

    /// Sync snapshot reference data: projects, tags and the inbox id
    pub async fn batch_check(&self) -> DidaResult<BatchCheck> {
        self.v2::<()>(Method::GET, "/batch/check/0", None)
            .await?
            .json()
    }

    /// Batch-check for task lookup, falling back to a v1-token cookie
    pub async fn batch_check_for_lookup(&self) -> DidaResult<TaskLookup> {
        let creds = self.session.credentials();
        let headers = if creds.v2_token.is_some() {
            headers::v2_headers(self.fingerprint, &creds)?
        } else {
            headers::v1_cookie_headers(&creds)?
        };
        self.send(
            Method::GET,
            self.endpoints.v2_url("/batch/check/0"),
            headers,
            None,
        )
        .await?
        .json()
    }

    /// Move tasks between projects in one call
    ///
    /// A non-empty `id2error` in the response is reported as [`DidaError::Partial`].
    pub async fn move_tasks(&self, moves: &[TaskMove]) -> DidaResult<BatchResult> {
        let result: BatchResult = self
            .v2(Method::POST, "/batch/taskProject", Some(&moves))
            .await?
            .json()?;

        if !result.id2error.is_empty() {
            return Err(DidaError::Partial {
                id2error: result.id2error,
            });
        }
        Ok(result)
    }
}
