//! MCP server implementation.
//!
//! This module contains the main server setup using rmcp.

use crate::context::Context;
use crate::models::{
    CreateDependencyParams, DeleteDependencyParams, DependencyViewParams, SetContextParams,
};
use crate::tools::Tools;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::{
    handler::server::ServerHandler, tool, tool_handler, tool_router, ErrorData as McpError,
    ServiceExt,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The taskdeps MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct TaskdepsMcpServer {
    /// Shared context for workspace management.
    context: Arc<RwLock<Context>>,
    /// Tool implementations.
    tools: Arc<Tools>,
    /// Tool router for MCP dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TaskdepsMcpServer {
    /// Set the workspace context for subsequent operations.
    #[tool(
        description = "Set the workspace root directory for all subsequent operations. Call this first before using other tools."
    )]
    async fn set_context(
        &self,
        Parameters(params): Parameters<SetContextParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.tools.set_context(&params.workspace_root).await?;
        Ok(CallToolResult::success(vec![Content::json(response)?]))
    }

    /// Get current workspace context information.
    #[tool(description = "Show current workspace context and dependency file path. Useful for debugging.")]
    async fn where_am_i(&self) -> Result<CallToolResult, McpError> {
        let response = self.tools.where_am_i().await;
        Ok(CallToolResult::success(vec![Content::json(response)?]))
    }

    /// Add a dependency between tasks.
    #[tool(
        description = "Record that task_id depends on depends_on_task_id. Fails with SELF_DEPENDENCY, TASK_NOT_FOUND, DUPLICATE_EDGE or CYCLE_DETECTED."
    )]
    async fn create_dependency(
        &self,
        Parameters(params): Parameters<CreateDependencyParams>,
    ) -> Result<CallToolResult, McpError> {
        let dependency = self
            .tools
            .create_dependency(
                &params.task_id,
                &params.depends_on_task_id,
                params.workspace_root.as_deref(),
            )
            .await?;
        Ok(CallToolResult::success(vec![Content::json(dependency)?]))
    }

    /// Delete a dependency by ID.
    #[tool(description = "Delete a dependency by its ID. Fails with NOT_FOUND for unknown IDs.")]
    async fn delete_dependency(
        &self,
        Parameters(params): Parameters<DeleteDependencyParams>,
    ) -> Result<CallToolResult, McpError> {
        let dependency = self
            .tools
            .delete_dependency(&params.edge_id, params.workspace_root.as_deref())
            .await?;
        Ok(CallToolResult::success(vec![Content::json(dependency)?]))
    }

    /// Get a project's dependency view.
    #[tool(
        description = "Show a project's tasks ordered by dependency level, with dependencies, dependents, isBlocking/isCritical flags, detected cycles and integrity warnings."
    )]
    async fn dependency_view(
        &self,
        Parameters(params): Parameters<DependencyViewParams>,
    ) -> Result<CallToolResult, McpError> {
        let view = self
            .tools
            .dependency_view(&params.project_id, params.workspace_root.as_deref())
            .await?;
        Ok(CallToolResult::success(vec![Content::json(view)?]))
    }
}

impl TaskdepsMcpServer {
    /// Create a new taskdeps MCP server.
    #[must_use]
    pub fn new() -> Self {
        let context = Arc::new(RwLock::new(Context::new()));
        let tools = Arc::new(Tools::new(Arc::clone(&context)));

        Self {
            context,
            tools,
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the context.
    #[must_use]
    pub fn context(&self) -> &Arc<RwLock<Context>> {
        &self.context
    }

    /// Serve MCP requests over stdin/stdout until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to initialize or the session
    /// ends abnormally.
    pub async fn run(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        tracing::info!("taskdeps-mcp server ready");
        service.waiting().await?;
        Ok(())
    }
}

impl Default for TaskdepsMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for TaskdepsMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "taskdeps-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "taskdeps MCP server for task dependency graphs. Call set_context first to set the workspace."
                    .into(),
            ),
        }
    }
}
