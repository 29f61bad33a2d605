//! Error types for taskdeps operations.
//!
//! Errors fall into the categories described by [`ErrorKind`]. Validation,
//! conflict and not-found errors are returned from mutations and lookups and
//! are never swallowed. Integrity problems found while reading (orphaned
//! edges, cycles that bypassed the API) are not errors at all: they travel
//! alongside successful results as [`crate::graph::IntegrityWarning`]s.

use crate::domain::{EdgeId, ProjectId, TaskId};
use crate::id_generation::IdGenerationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or self-referential input, rejected before any state change
    Validation,

    /// Well-formed request that would violate a graph invariant
    Conflict,

    /// Referenced edge, task or project does not exist
    NotFound,

    /// I/O, serialization or configuration failure
    Infrastructure,
}

/// The error type for taskdeps operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A task was asked to depend on itself.
    #[error("Task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// The exact dependency pair already exists.
    #[error("Dependency already exists: {task_id} -> {depends_on} ({existing})")]
    DuplicateEdge {
        task_id: TaskId,
        depends_on: TaskId,
        existing: EdgeId,
    },

    /// Adding the dependency would close a loop.
    #[error(
        "Adding {task_id} -> {depends_on} would create a circular dependency: {}",
        format_cycle(.task_id, .path)
    )]
    CycleDetected {
        task_id: TaskId,
        depends_on: TaskId,
        /// Existing path from `depends_on` back to `task_id`
        path: Vec<TaskId>,
    },

    /// Task not found in the task store.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Dependency edge not found.
    #[error("Dependency not found: {0}")]
    EdgeNotFound(EdgeId),

    /// Project not found in the project store.
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Edge identifier generation failed.
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenerationError),
}

impl Error {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SelfDependency(_) => ErrorKind::Validation,
            Self::DuplicateEdge { .. } | Self::CycleDetected { .. } => ErrorKind::Conflict,
            Self::TaskNotFound(_) | Self::EdgeNotFound(_) | Self::ProjectNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Io(_) | Self::Json(_) | Self::Config(_) | Self::IdGeneration(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// Stable machine-readable error code, suitable for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SelfDependency(_) => "SELF_DEPENDENCY",
            Self::DuplicateEdge { .. } => "DUPLICATE_EDGE",
            Self::CycleDetected { .. } => "CYCLE_DETECTED",
            Self::TaskNotFound(_) => "TASK_NOT_FOUND",
            Self::EdgeNotFound(_) => "NOT_FOUND",
            Self::ProjectNotFound(_) => "PROJECT_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::IdGeneration(_) => "ID_GENERATION_FAILED",
        }
    }
}

/// Configuration and workspace errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.taskdeps/` directory found.
    #[error("Not a taskdeps workspace (or any parent directory). Run 'taskdeps init' first.")]
    NotInitialized,

    /// Workspace already initialized.
    #[error("taskdeps is already initialized here. Found existing '{}'", .0.display())]
    AlreadyInitialized(PathBuf),

    /// YAML parse or write failure.
    #[error("Configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Semantically invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A specialized Result type for taskdeps operations.
pub type Result<T> = std::result::Result<T, Error>;

fn format_cycle(task_id: &TaskId, path: &[TaskId]) -> String {
    let mut parts = Vec::with_capacity(path.len() + 2);
    parts.push(task_id.as_str());
    parts.extend(path.iter().map(TaskId::as_str));
    parts.push(task_id.as_str());
    parts.join(" -> ")
}
