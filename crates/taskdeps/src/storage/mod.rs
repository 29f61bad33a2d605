//! Collaborator interfaces and persistence.
//!
//! Tasks and projects belong to the surrounding application. The engine only
//! reads them, through the [`TaskStore`] and [`ProjectStore`] traits. Both
//! traits are async and object-safe so a database-backed implementation can
//! sit behind `Arc<dyn TaskStore>` as easily as [`InMemoryTaskStore`].
//!
//! Dependency edges are owned by [`crate::graph::GraphStore`]; [`jsonl`]
//! persists them and loads task exports.
//!
//! # Example
//!
//! ```
//! use taskdeps::domain::{Task, TaskStatus};
//! use taskdeps::storage::{InMemoryTaskStore, TaskStore};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> taskdeps::error::Result<()> {
//!     let store = InMemoryTaskStore::from_tasks([
//!         Task::new("t1", "p1", TaskStatus::Todo, "Design schema"),
//!     ]);
//!
//!     let task = store.get_task(&"t1".into()).await?;
//!     assert_eq!(task.map(|t| t.title), Some("Design schema".to_string()));
//!     Ok(())
//! }
//! ```

use crate::domain::{ProjectId, Task, TaskId};
use crate::error::Result;
use async_trait::async_trait;

mod in_memory;
pub mod jsonl;

pub use in_memory::InMemoryTaskStore;
pub use jsonl::LoadWarning;

/// Read access to tasks.
///
/// Implementations must be `Send + Sync`; the dependency service shares one
/// instance across concurrent requests.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Get a task by ID.
    ///
    /// Returns `None` if the task doesn't exist.
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>>;

    /// All tasks belonging to a project, in any order.
    async fn list_tasks_by_project(&self, project_id: &ProjectId) -> Result<Vec<Task>>;

    /// Whether a task exists
    async fn task_exists(&self, id: &TaskId) -> Result<bool> {
        Ok(self.get_task(id).await?.is_some())
    }
}

/// Read access to projects.
///
/// Only used to resolve project-scoped queries.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Whether a project exists
    async fn project_exists(&self, project_id: &ProjectId) -> Result<bool>;
}
