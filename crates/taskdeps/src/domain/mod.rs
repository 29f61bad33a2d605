//! Domain types for the task dependency graph.
//!
//! Tasks and projects are owned by the surrounding application and are only
//! ever read here. The one entity this crate owns is the [`DependencyEdge`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length accepted for any task, project or edge identifier.
pub const MAX_ID_LENGTH: usize = 128;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id! {
    /// Identifier of a task owned by the external task store
    TaskId
}

string_id! {
    /// Identifier of a project owned by the external project store
    ProjectId
}

string_id! {
    /// Identifier of a dependency edge (e.g. `dep-k3x9qa`)
    EdgeId
}

/// Workflow status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    Todo,

    /// Currently being worked on
    InProgress,

    /// Waiting for review
    Review,

    /// Done
    Completed,

    /// Manually flagged as blocked
    Blocked,
}

impl TaskStatus {
    /// The wire name of this status
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project task, as seen by the dependency engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier
    pub id: TaskId,

    /// Owning project
    pub project_id: ProjectId,

    /// Current workflow status
    pub status: TaskStatus,

    /// Task title
    pub title: String,
}

impl Task {
    /// Create a task value
    pub fn new(
        id: impl Into<TaskId>,
        project_id: impl Into<ProjectId>,
        status: TaskStatus,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            status,
            title: title.into(),
        }
    }
}

/// A directed depends-on relation: `task_id` cannot be considered complete
/// before `depends_on_task_id` is.
///
/// In graph terms this is the edge `task_id -> depends_on_task_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    /// Edge identifier
    pub id: EdgeId,

    /// The dependent task
    pub task_id: TaskId,

    /// The task being depended upon
    pub depends_on_task_id: TaskId,

    /// When the edge was created
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// Create an edge stamped with the current time
    pub fn new(id: EdgeId, task_id: TaskId, depends_on_task_id: TaskId) -> Self {
        Self {
            id,
            task_id,
            depends_on_task_id,
            created_at: Utc::now(),
        }
    }

    /// Whether this edge points a task at itself
    pub fn is_self_dependency(&self) -> bool {
        self.task_id == self.depends_on_task_id
    }
}
