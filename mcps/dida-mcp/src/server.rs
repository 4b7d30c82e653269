//! MCP Server implementation
//!
//! This module defines the MCP server that exposes the Dida365 API as tools,
//! plus the cached-data resource and the GTD prompts. Handler
//! implementations are in the handlers module.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, GetPromptRequestParam, GetPromptResult, ListPromptsResult,
        ListResourcesResult, PaginatedRequestParam, ReadResourceRequestParam,
        ReadResourceResult, ServerCapabilities, ServerInfo,
    },
    service::{Peer, RequestContext},
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use tracing::{debug, warn};

use crate::client::DidaClient;
use crate::handlers;
use crate::params::*;
use crate::types::TaskMove;
use crate::{prompts, resources};

/// The main Dida MCP Server
#[derive(Clone)]
pub struct DidaMcpServer {
    client: DidaClient,
    tool_router: ToolRouter<Self>,
}

impl DidaMcpServer {
    /// Tell the client the cached resource changed if `before` is stale
    async fn notify_if_changed(&self, peer: &Peer<RoleServer>, before: u64) {
        if self.client.session().revision() == before {
            return;
        }
        debug!("reference data cache changed; notifying client");
        if let Err(e) = peer.notify_resource_list_changed().await {
            warn!(error = %e, "failed to send resource list changed notification");
        }
    }

    fn revision(&self) -> u64 {
        self.client.session().revision()
    }
}

// ============================================================================
// Tool Router - Each tool delegates to its handler
// ============================================================================

#[tool_router]
impl DidaMcpServer {
    pub fn new(client: DidaClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    pub fn client(&self) -> &DidaClient {
        &self.client
    }

    // ========================================================================
    // Auth
    // ========================================================================

    #[tool(
        name = "authenticate",
        description = "Authenticate with the configured v1 (OAuth) and v2 (web session) tokens and cache projects, tags and the inbox id"
    )]
    async fn authenticate(
        &self,
        Parameters(_): Parameters<EmptyParams>,
        peer: Peer<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let before = self.revision();
        let reply = handlers::authenticate(&self.client).await;
        self.notify_if_changed(&peer, before).await;
        reply
    }

    #[tool(
        name = "check-auth-status",
        description = "Show which API tokens are configured and how much reference data is cached. Does not contact the server"
    )]
    async fn check_auth_status(
        &self,
        Parameters(_): Parameters<EmptyParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::check_auth_status(&self.client).await
    }

    #[tool(
        name = "list-cached-data",
        description = "Show cached projects (with the Inbox), tags and the inbox id, for mapping names to ids"
    )]
    async fn list_cached_data(
        &self,
        Parameters(_): Parameters<EmptyParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_cached_data(&self.client).await
    }

    // ========================================================================
    // Projects
    // ========================================================================

    #[tool(name = "list-projects", description = "List all projects")]
    async fn list_projects(
        &self,
        Parameters(_): Parameters<EmptyParams>,
        peer: Peer<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let before = self.revision();
        let reply = handlers::list_projects(&self.client).await;
        self.notify_if_changed(&peer, before).await;
        reply
    }

    #[tool(
        name = "create-project",
        description = "Create a project with a name and optional hex color"
    )]
    async fn create_project(
        &self,
        Parameters(params): Parameters<CreateProjectParams>,
        peer: Peer<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let before = self.revision();
        let reply = handlers::create_project(&self.client, params).await;
        self.notify_if_changed(&peer, before).await;
        reply
    }

    #[tool(name = "update-project", description = "Rename or recolor a project")]
    async fn update_project(
        &self,
        Parameters(params): Parameters<UpdateProjectParams>,
        peer: Peer<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let before = self.revision();
        let reply = handlers::update_project(&self.client, params).await;
        self.notify_if_changed(&peer, before).await;
        reply
    }

    #[tool(
        name = "delete-project",
        description = "Delete a project and all of its tasks. This cannot be undone"
    )]
    async fn delete_project(
        &self,
        Parameters(params): Parameters<DeleteProjectParams>,
        peer: Peer<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let before = self.revision();
        let reply = handlers::delete_project(&self.client, params).await;
        self.notify_if_changed(&peer, before).await;
        reply
    }

    #[tool(
        name = "refresh-project-cache",
        description = "Re-fetch the project list into the cache"
    )]
    async fn refresh_project_cache(
        &self,
        Parameters(_): Parameters<EmptyParams>,
        peer: Peer<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let before = self.revision();
        let reply = handlers::refresh_project_cache(&self.client).await;
        self.notify_if_changed(&peer, before).await;
        reply
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    #[tool(
        name = "list-tasks",
        description = "List the tasks of a project. Without projectId the Inbox is listed"
    )]
    async fn list_tasks(
        &self,
        Parameters(params): Parameters<ListTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_tasks(&self.client, params).await
    }

    #[tool(
        name = "get-task",
        description = "Get one task by id. Without projectId the Inbox is searched"
    )]
    async fn get_task(
        &self,
        Parameters(params): Parameters<GetTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::get_task(&self.client, params).await
    }

    #[tool(
        name = "create-task",
        description = "Create a task with title, optional notes, priority, due date, tags and project (defaults to the Inbox)"
    )]
    async fn create_task(
        &self,
        Parameters(params): Parameters<CreateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::create_task(&self.client, params).await
    }

    #[tool(
        name = "update-task",
        description = "Update a task. Only supplied fields change; empty dueDate, startDate or tags clear them"
    )]
    async fn update_task(
        &self,
        Parameters(params): Parameters<UpdateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::update_task(&self.client, params).await
    }

    #[tool(
        name = "complete-task",
        description = "Mark a task complete. The owning project is looked up automatically"
    )]
    async fn complete_task(
        &self,
        Parameters(params): Parameters<CompleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::complete_task(&self.client, params).await
    }

    #[tool(
        name = "delete-task",
        description = "Delete a task. Without projectId the Inbox is assumed. This cannot be undone"
    )]
    async fn delete_task(
        &self,
        Parameters(params): Parameters<DeleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::delete_task(&self.client, params).await
    }

    #[tool(
        name = "move-task",
        description = "Move a task to another project. Requires the v2 web token"
    )]
    async fn move_task(
        &self,
        Parameters(params): Parameters<TaskMove>,
    ) -> Result<CallToolResult, McpError> {
        handlers::move_task(&self.client, params).await
    }

    #[tool(
        name = "batch-move-tasks",
        description = "Move several tasks between projects in one call. Requires the v2 web token"
    )]
    async fn batch_move_tasks(
        &self,
        Parameters(params): Parameters<BatchMoveTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::batch_move_tasks(&self.client, params).await
    }

    #[tool(
        name = "batch-update-tasks",
        description = "Update several tasks concurrently and report per-task results"
    )]
    async fn batch_update_tasks(
        &self,
        Parameters(params): Parameters<BatchUpdateTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::batch_update_tasks(&self.client, params).await
    }

    #[tool(
        name = "batch-delete-tasks",
        description = "Delete several tasks concurrently and report per-task results. This cannot be undone"
    )]
    async fn batch_delete_tasks(
        &self,
        Parameters(params): Parameters<BatchDeleteTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::batch_delete_tasks(&self.client, params).await
    }
}

// ============================================================================
// Server Handler - Provides server metadata, resources and prompts
// ============================================================================

#[tool_handler]
impl ServerHandler for DidaMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut capabilities = ServerCapabilities::builder()
            .enable_tools()
            .enable_resources()
            .enable_prompts()
            .build();
        if let Some(resources) = capabilities.resources.as_mut() {
            resources.list_changed = Some(true);
        }

        ServerInfo {
            instructions: Some(
                "Dida365 / TickTick task server. Tasks are addressed by id plus projectId; \
                 the Inbox is used when projectId is omitted. Run authenticate first, then use \
                 list-cached-data to map project and tag names to ids. Every tool returns a JSON \
                 envelope {success, data, message?, error?}."
                    .into(),
            ),
            capabilities,
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _pagination: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(resources::list_all_resources())
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        resources::read_resource(self.client.session(), &request.uri)
    }

    async fn list_prompts(
        &self,
        _pagination: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(prompts::list_all_prompts())
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        prompts::get_prompt(&request.name)
    }
}
