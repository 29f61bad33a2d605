//! MCP request and response models.
//!
//! Parameter types derive `JsonSchema` so rmcp can advertise tool input
//! schemas. Responses wrap or transform taskdeps domain types for MCP
//! transport.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use taskdeps::domain::DependencyEdge;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the `set_context` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetContextParams {
    /// Path of the workspace root (the directory containing `.taskdeps/`).
    pub workspace_root: String,
}

/// Parameters for the `create_dependency` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateDependencyParams {
    /// The dependent task.
    pub task_id: String,

    /// The task it depends on.
    pub depends_on_task_id: String,

    /// Workspace to use instead of the current context.
    #[serde(default)]
    pub workspace_root: Option<String>,
}

/// Parameters for the `delete_dependency` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteDependencyParams {
    /// ID of the dependency to delete (e.g., `dep-a1b2c3`).
    pub edge_id: String,

    /// Workspace to use instead of the current context.
    #[serde(default)]
    pub workspace_root: Option<String>,
}

/// Parameters for the `dependency_view` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DependencyViewParams {
    /// Project to report on.
    pub project_id: String,

    /// Workspace to use instead of the current context.
    #[serde(default)]
    pub workspace_root: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// Response from the `set_context` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetContextResponse {
    /// The workspace root that was set.
    pub workspace_root: String,

    /// The path to the dependency file.
    pub dependencies_path: String,

    /// Problems found while loading the workspace's data files.
    pub load_warnings: Vec<String>,

    /// Status message.
    pub message: String,
}

/// Response from the `where_am_i` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WhereAmIResponse {
    /// The current workspace root, if set.
    pub workspace_root: Option<String>,

    /// The current dependency file, if set.
    pub dependencies_path: Option<String>,

    /// Whether a context is currently set.
    pub context_set: bool,
}

/// Dependency edge representation for MCP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct McpDependency {
    /// Edge identifier.
    pub id: String,

    /// The dependent task.
    pub task_id: String,

    /// The task being depended upon.
    pub depends_on_task_id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

impl From<DependencyEdge> for McpDependency {
    fn from(edge: DependencyEdge) -> Self {
        Self {
            id: edge.id.0,
            task_id: edge.task_id.0,
            depends_on_task_id: edge.depends_on_task_id.0,
            created_at: edge.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mcp_dependency_from_edge() {
        let edge = DependencyEdge::new("dep-abc123".into(), "t2".into(), "t1".into());
        let created_at = edge.created_at;

        let dep = McpDependency::from(edge);
        assert_eq!(dep.id, "dep-abc123");
        assert_eq!(dep.task_id, "t2");
        assert_eq!(dep.depends_on_task_id, "t1");
        assert_eq!(dep.created_at, created_at.to_rfc3339());
    }

    #[test]
    fn test_params_workspace_root_is_optional() {
        let params: CreateDependencyParams =
            serde_json::from_str(r#"{"task_id":"t2","depends_on_task_id":"t1"}"#).unwrap();
        assert!(params.workspace_root.is_none());
    }
}
