//! Auth and cache inspection handlers

use serde::Serialize;

use mcp_common::envelope;

use crate::auth::reconcile;
use crate::client::DidaClient;
use crate::error::DidaError;

use super::{failure, Reply};

/// Run the dual-auth reconciler
pub async fn authenticate(client: &DidaClient) -> Reply {
    match reconcile(client).await {
        Ok(report) => envelope(&report.data(), true, Some(&report.message())),
        Err(e) => failure(e, "Authentication failed"),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenStatus {
    configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    oauth: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheCounts {
    projects: usize,
    tags: usize,
    inbox_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthStatus {
    v1_api: TokenStatus,
    v2_api: TokenStatus,
    cached_data: CacheCounts,
}

/// Report configured credentials and cache counts without calling upstream
pub async fn check_auth_status(client: &DidaClient) -> Reply {
    let session = client.session();
    let creds = session.credentials();
    let status = AuthStatus {
        v1_api: TokenStatus {
            configured: creds.v1_token.is_some(),
            oauth: creds.v1_token.as_ref().map(|_| creds.v1_is_oauth),
        },
        v2_api: TokenStatus {
            configured: creds.v2_token.is_some(),
            oauth: None,
        },
        cached_data: CacheCounts {
            projects: session.project_count(),
            tags: session.tag_count(),
            inbox_id: creds.inbox_id.clone(),
        },
    };

    let message = match (creds.v1_token.is_some(), creds.v2_token.is_some()) {
        (true, true) => "Both v1 and v2 API tokens are configured",
        (true, false) => "Only the v1 API token is configured",
        (false, true) => "Only the v2 API token is configured",
        (false, false) => "No API tokens configured. Add tokens to the config file",
    };
    envelope(&status, creds.has_any_token(), Some(message))
}

/// Return the reference data cache
pub async fn list_cached_data(client: &DidaClient) -> Reply {
    let session = client.session();
    if !session.credentials().has_any_token() {
        return failure(DidaError::NoCredentials, "Failed to list cached data");
    }

    let snapshot = session.snapshot();
    let message = format!(
        "Found {} cached projects and {} cached tags",
        snapshot.projects.len(),
        snapshot.tags.len()
    );
    envelope(&snapshot, true, Some(&message))
}
