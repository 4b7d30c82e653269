//! Project handler implementations (v1 API)
//!
//! Mutations re-fetch the project list afterwards so the cache does not go
//! stale. That refresh is best-effort: its failure is logged and the
//! mutation still reports success.

use mcp_common::envelope;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::auth::{install_projects, refresh_project_cache as refresh_cache};
use crate::client::DidaClient;
use crate::params::{CreateProjectParams, DeleteProjectParams, UpdateProjectParams, Validate};
use crate::types::{NewProject, ProjectProfile};

use super::{failure, respond, Reply};

const DEFAULT_PROJECT_COLOR: &str = "#F18181";

async fn refresh_after_mutation(client: &DidaClient) {
    if let Err(e) = refresh_cache(client).await {
        warn!(error = %e, "project cache refresh after mutation failed");
    }
}

/// List projects and repopulate the cached project mapping
pub async fn list_projects(client: &DidaClient) -> Reply {
    let projects = match client.list_projects().await {
        Ok(projects) => projects,
        Err(e) => return failure(e, "Failed to list projects"),
    };

    let profiles = projects
        .iter()
        .filter_map(|p| serde_json::from_value::<ProjectProfile>(p.clone()).ok())
        .collect();
    install_projects(client, profiles);

    let message = format!("Found {} projects", projects.len());
    envelope(&projects, true, Some(&message))
}

pub async fn create_project(client: &DidaClient, params: CreateProjectParams) -> Reply {
    const CONTEXT: &str = "Failed to create project";
    if let Err(e) = params.validate() {
        return failure(e, CONTEXT);
    }

    let body = NewProject {
        name: params.name,
        color: params
            .color
            .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()),
        view_mode: "list".to_string(),
        kind: "TASK".to_string(),
    };
    let outcome = client.create_project(&body).await;
    if outcome.is_ok() {
        refresh_after_mutation(client).await;
    }
    respond(outcome, CONTEXT, "Project created successfully")
}

pub async fn update_project(client: &DidaClient, params: UpdateProjectParams) -> Reply {
    const CONTEXT: &str = "Failed to update project";
    if let Err(e) = params.validate() {
        return failure(e, CONTEXT);
    }

    let mut changes = Map::new();
    if let Some(name) = params.name {
        changes.insert("name".into(), Value::String(name));
    }
    if let Some(color) = params.color {
        changes.insert("color".into(), Value::String(color));
    }

    let outcome = client
        .update_project(&params.id, &Value::Object(changes))
        .await;
    if outcome.is_ok() {
        refresh_after_mutation(client).await;
    }
    respond(outcome, CONTEXT, "Project updated successfully")
}

pub async fn delete_project(client: &DidaClient, params: DeleteProjectParams) -> Reply {
    const CONTEXT: &str = "Failed to delete project";
    if let Err(e) = params.validate() {
        return failure(e, CONTEXT);
    }

    let outcome = client
        .delete_project(&params.id)
        .await
        .map(|()| json!({ "id": params.id }));
    if outcome.is_ok() {
        refresh_after_mutation(client).await;
    }
    respond(outcome, CONTEXT, "Project deleted successfully")
}

/// Re-fetch the project list into the cache
pub async fn refresh_project_cache(client: &DidaClient) -> Reply {
    let outcome = refresh_cache(client).await.map(|projects| {
        json!({
            "projects": projects,
            "tags": client.session().tag_count(),
            "inboxId": client.session().inbox_id(),
        })
    });
    respond(outcome, "Failed to refresh project cache", "Project cache refreshed")
}
