//! Error types for the taskdeps MCP server.

use rmcp::ErrorData as McpError;
use serde_json::json;
use taskdeps::error::ErrorKind;
use thiserror::Error;

/// Errors that can occur in the taskdeps MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// No workspace context has been set.
    #[error("No workspace context set. Call set_context first.")]
    NoContext,

    /// The specified workspace was not found or path is invalid.
    #[error("Workspace not found: {path}")]
    WorkspaceNotFound {
        /// The path that was not found.
        path: String,
        /// The underlying IO error, if any.
        #[source]
        source: Option<std::io::Error>,
    },

    /// Workspace exists but was not initialized via `set_context`.
    #[error("Workspace not initialized: {0}. Call set_context first.")]
    WorkspaceNotInitialized(String),

    /// No `.taskdeps/` directory at or above the given path.
    #[error("No .taskdeps directory found in {0} or parent directories")]
    NoTaskdepsDirectory(String),

    /// An error from the dependency engine.
    #[error(transparent)]
    Engine(#[from] taskdeps::error::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable error code.
    ///
    /// Engine errors keep their own codes (`CYCLE_DETECTED`, `NOT_FOUND`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoContext => "NO_CONTEXT",
            Self::WorkspaceNotFound { .. } => "WORKSPACE_NOT_FOUND",
            Self::WorkspaceNotInitialized(_) => "WORKSPACE_NOT_INITIALIZED",
            Self::NoTaskdepsDirectory(_) => "NO_TASKDEPS_DIRECTORY",
            Self::Engine(e) => e.code(),
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the caller can fix this by changing the request
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Engine(e) => matches!(
                e.kind(),
                ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::NotFound
            ),
            Self::Io(_) => false,
            _ => true,
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = err.code();
        let message = format!("{code}: {err}");
        let data = Some(json!({ "code": code }));

        if err.is_client_error() {
            McpError::invalid_params(message, data)
        } else {
            McpError::internal_error(message, data)
        }
    }
}

/// Result type for taskdeps MCP operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use taskdeps::domain::TaskId;

    #[test]
    fn test_domain_error_maps_to_invalid_params() {
        let err = Error::from(taskdeps::error::Error::SelfDependency(TaskId::new("t1")));
        let mcp: McpError = err.into();

        assert_eq!(mcp.code, ErrorCode::INVALID_PARAMS);
        assert!(mcp.message.starts_with("SELF_DEPENDENCY: "));
        assert_eq!(mcp.data, Some(json!({ "code": "SELF_DEPENDENCY" })));
    }

    #[test]
    fn test_io_error_maps_to_internal_error() {
        let err = Error::Io(std::io::Error::other("disk full"));
        let mcp: McpError = err.into();
        assert_eq!(mcp.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_no_context_is_client_error() {
        let mcp: McpError = Error::NoContext.into();
        assert_eq!(mcp.code, ErrorCode::INVALID_PARAMS);
        assert!(mcp.message.contains("NO_CONTEXT"));
    }
}
