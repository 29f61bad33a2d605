//! MCP tool implementations.
//!
//! This module contains the implementations for all MCP tools exposed by the
//! server. Mutating tools persist the workspace's edge set before returning;
//! when the save fails the in-memory change is undone so the cached graph
//! matches the file on disk.

use crate::context::Context;
use crate::error::Result;
use crate::models::{McpDependency, SetContextResponse, WhereAmIResponse};
use std::path::Path;
use std::sync::Arc;
use taskdeps::app::App;
use taskdeps::domain::{EdgeId, ProjectId, TaskId};
use taskdeps::graph::ProjectDependencyView;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Tool implementations for the taskdeps MCP server.
pub struct Tools {
    context: Arc<RwLock<Context>>,
}

impl Tools {
    /// Create a new Tools instance with the given context.
    pub fn new(context: Arc<RwLock<Context>>) -> Self {
        Self { context }
    }

    /// Set the workspace context.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace path is invalid, has no `.taskdeps/`
    /// directory, or fails to load.
    pub async fn set_context(&self, workspace_root: &str) -> Result<SetContextResponse> {
        let path = Path::new(workspace_root);
        let mut context = self.context.write().await;
        let info = context.set_workspace(path).await?;

        Ok(SetContextResponse {
            workspace_root: info.workspace_root.display().to_string(),
            dependencies_path: info.dependencies_path.display().to_string(),
            load_warnings: info.load_warnings,
            message: "Context set successfully".to_string(),
        })
    }

    /// Get current workspace information.
    pub async fn where_am_i(&self) -> WhereAmIResponse {
        let context = self.context.read().await;

        WhereAmIResponse {
            workspace_root: context
                .current_workspace()
                .map(|ws| ws.display().to_string()),
            dependencies_path: context
                .current_dependencies_path()
                .map(|p| p.display().to_string()),
            context_set: context.current_workspace().is_some(),
        }
    }

    /// Record that `task_id` depends on `depends_on_task_id`.
    ///
    /// # Errors
    ///
    /// Returns engine errors (`SELF_DEPENDENCY`, `TASK_NOT_FOUND`,
    /// `DUPLICATE_EDGE`, `CYCLE_DETECTED`) unchanged, a context error, or the
    /// save error after the new edge has been withdrawn.
    pub async fn create_dependency(
        &self,
        task_id: &str,
        depends_on_task_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<McpDependency> {
        let app = self.app(workspace_root).await?;

        let edge = app
            .service()
            .add_dependency(&TaskId::new(task_id), &TaskId::new(depends_on_task_id))
            .await?;

        if let Err(err) = app.save().await {
            if let Err(rollback) = app.service().remove_dependency(&edge.id).await {
                warn!(edge_id = %edge.id, error = %rollback, "Failed to withdraw unsaved dependency");
            }
            return Err(err.into());
        }

        info!(edge_id = %edge.id, task_id, depends_on_task_id, "Created dependency");
        Ok(edge.into())
    }

    /// Delete a dependency by ID.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` for an unknown edge ID, a context error, or the
    /// save error after the edge has been restored.
    pub async fn delete_dependency(
        &self,
        edge_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<McpDependency> {
        let app = self.app(workspace_root).await?;

        let edge = app.service().remove_dependency(&EdgeId::new(edge_id)).await?;

        if let Err(err) = app.save().await {
            for rejected in app.service().import(vec![edge.clone()]).await {
                warn!(edge_id, "Failed to restore unsaved deletion: {rejected}");
            }
            return Err(err.into());
        }

        info!(edge_id, "Deleted dependency");
        Ok(edge.into())
    }

    /// Project dependency view: levels, flags, cycles and warnings.
    ///
    /// # Errors
    ///
    /// Returns `PROJECT_NOT_FOUND` for an unknown project, or a context error.
    pub async fn dependency_view(
        &self,
        project_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<ProjectDependencyView> {
        let app = self.app(workspace_root).await?;
        Ok(app
            .service()
            .project_dependency_view(&ProjectId::new(project_id))
            .await?)
    }

    /// Resolve the engine and release the context lock before using it.
    async fn app(&self, workspace_root: Option<&str>) -> Result<Arc<App>> {
        let context = self.context.read().await;
        context.app_for(workspace_root.map(Path::new))
    }
}
