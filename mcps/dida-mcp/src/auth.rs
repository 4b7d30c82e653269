//! Dual-auth reconciliation and project cache refresh
//!
//! The v2 batch-check is the richer source (projects, tags and the inbox id);
//! v1 only lists projects. Both attempts build into local maps, and the cache
//! is only touched once at least one attempt succeeded.

use serde::Serialize;
use tracing::{info, warn};

use crate::client::DidaClient;
use crate::error::{DidaError, DidaResult};
use crate::session::{inject_inbox, InboxUpdate, ProjectMap, TagMap};
use crate::types::ProjectProfile;

/// Outcome of one attempt against an API generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// No token configured for this generation
    Skipped,
    Succeeded,
    Failed(String),
}

impl AttemptOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, AttemptOutcome::Succeeded)
    }

    fn failure(&self) -> Option<String> {
        match self {
            AttemptOutcome::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }
}

/// Summary returned by a successful [`reconcile`]
#[derive(Debug, Clone)]
pub struct AuthReport {
    pub v1: AttemptOutcome,
    pub v2: AttemptOutcome,
    pub projects: usize,
    pub tags: usize,
    pub inbox_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiStatus {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CachedCounts {
    projects: usize,
    tags: usize,
    inbox_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    v1_api: ApiStatus,
    v2_api: ApiStatus,
    cached_data: CachedCounts,
}

impl AuthReport {
    pub fn data(&self) -> AuthData {
        AuthData {
            v1_api: ApiStatus {
                authenticated: self.v1.succeeded(),
                method: Some("OAuth"),
            },
            v2_api: ApiStatus {
                authenticated: self.v2.succeeded(),
                method: None,
            },
            cached_data: CachedCounts {
                projects: self.projects,
                tags: self.tags,
                inbox_id: self.inbox_id.clone(),
            },
        }
    }

    /// Human-readable summary, one line per attempt plus cache counts
    pub fn message(&self) -> String {
        let mut lines = Vec::new();
        for (name, outcome) in [("V2", &self.v2), ("V1", &self.v1)] {
            match outcome {
                AttemptOutcome::Skipped => {}
                AttemptOutcome::Succeeded => {
                    lines.push(format!("Successfully authenticated with {} API token", name.to_lowercase()))
                }
                AttemptOutcome::Failed(reason) => {
                    lines.push(format!("{} API authentication failed: {}", name, reason))
                }
            }
        }
        lines.push(format!(
            "Found {} projects and {} tags",
            self.projects, self.tags
        ));
        lines.push(format!(
            "Inbox ID: {}",
            self.inbox_id.as_deref().unwrap_or("Not found")
        ));
        lines.join("\n")
    }
}

/// Try both API generations and rebuild the reference data cache
///
/// Partial success is success; only "no credentials" and "every configured
/// credential failed" are errors.
pub async fn reconcile(client: &DidaClient) -> DidaResult<AuthReport> {
    let creds = client.session().credentials();
    if !creds.has_any_token() {
        return Err(DidaError::NoCredentials);
    }

    let mut projects = ProjectMap::new();
    let mut tags = TagMap::new();
    let mut inbox_id = creds.inbox_id.clone();

    let mut v2 = AttemptOutcome::Skipped;
    if creds.v2_token.is_some() {
        match client.batch_check().await {
            Ok(check) => {
                projects = check
                    .project_profiles
                    .into_iter()
                    .map(|p| (p.id.clone(), p.into()))
                    .collect();
                tags = check
                    .tags
                    .into_iter()
                    .map(|t| (t.name.clone(), t.into()))
                    .collect();
                inbox_id = check.inbox_id;
                inject_inbox(&mut projects, inbox_id.as_deref());
                info!(projects = projects.len(), tags = tags.len(), "v2 authentication succeeded");
                v2 = AttemptOutcome::Succeeded;
            }
            Err(e) => {
                warn!(error = %e, "v2 authentication failed");
                v2 = AttemptOutcome::Failed(e.to_string());
            }
        }
    }

    let mut v1 = AttemptOutcome::Skipped;
    if creds.v1_token.is_some() {
        match client.list_project_profiles().await {
            Ok(profiles) => {
                if !v2.succeeded() {
                    projects = project_map(profiles, inbox_id.as_deref());
                    tags = TagMap::new();
                }
                info!("v1 authentication succeeded");
                v1 = AttemptOutcome::Succeeded;
            }
            Err(e) => {
                warn!(error = %e, "v1 authentication failed");
                v1 = AttemptOutcome::Failed(e.to_string());
            }
        }
    }

    if !v1.succeeded() && !v2.succeeded() {
        return Err(DidaError::AllAuthFailed {
            v1: v1.failure(),
            v2: v2.failure(),
        });
    }

    let session = client.session();
    let report = AuthReport {
        projects: projects.len(),
        tags: tags.len(),
        inbox_id: inbox_id.clone(),
        v1,
        v2,
    };

    session.clear_reference_data();
    session.replace_reference_data(projects, tags);
    if let Some(id) = &inbox_id {
        session.set_credentials(
            creds.v1_token.clone(),
            creds.v1_is_oauth,
            creds.v2_token.clone(),
            InboxUpdate::Set(id.clone()),
        );
        persist_inbox_id(client, id);
    }

    Ok(report)
}

/// Re-fetch the v1 project list into the cache, keeping tags
///
/// Returns the number of cached projects (Inbox included).
pub async fn refresh_project_cache(client: &DidaClient) -> DidaResult<usize> {
    let profiles = client.list_project_profiles().await?;
    Ok(install_projects(client, profiles))
}

/// Replace the cached projects with `profiles` plus the Inbox entry
pub fn install_projects(client: &DidaClient, profiles: Vec<ProjectProfile>) -> usize {
    let session = client.session();
    let projects = project_map(profiles, session.inbox_id().as_deref());
    let count = projects.len();
    session.replace_projects(projects);
    info!(projects = count, "project cache refreshed");
    count
}

fn project_map(profiles: Vec<ProjectProfile>, inbox_id: Option<&str>) -> ProjectMap {
    let mut projects: ProjectMap = profiles
        .into_iter()
        .map(|p| (p.id.clone(), p.into()))
        .collect();
    inject_inbox(&mut projects, inbox_id);
    projects
}

fn persist_inbox_id(client: &DidaClient, inbox_id: &str) {
    if let Some(store) = client.config_store() {
        if let Err(e) = store.save_inbox_id(inbox_id) {
            warn!(path = %store.path().display(), error = %e, "failed to save inbox id to config");
        }
    }
}
