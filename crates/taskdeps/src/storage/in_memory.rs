//! In-memory task and project store.
//!
//! Backs the CLI and MCP server (loaded from a `tasks.jsonl` export) and the
//! test suite. Data lives in an `Arc<RwLock<..>>` so clones share state and
//! tests can change task status or delete tasks between reads.

use super::{ProjectStore, TaskStore};
use crate::domain::{ProjectId, Task, TaskId, TaskStatus};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    tasks: HashMap<TaskId, Task>,

    /// Projects declared explicitly, in addition to those implied by tasks
    projects: HashSet<ProjectId>,
}

impl Inner {
    fn knows_project(&self, project_id: &ProjectId) -> bool {
        self.projects.contains(project_id)
            || self.tasks.values().any(|task| &task.project_id == project_id)
    }
}

/// Thread-safe in-memory implementation of [`TaskStore`] and [`ProjectStore`].
///
/// A project exists if it was declared with [`add_project`](Self::add_project)
/// or if at least one task belongs to it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `tasks`. Later duplicates replace earlier ones.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let inner = Inner {
            tasks: tasks
                .into_iter()
                .map(|task| (task.id.clone(), task))
                .collect(),
            projects: HashSet::new(),
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Insert or replace a task, returning the previous value
    pub async fn insert_task(&self, task: Task) -> Option<Task> {
        self.inner.write().await.tasks.insert(task.id.clone(), task)
    }

    /// Remove a task, returning it if present.
    ///
    /// Edges that reference the task are left alone; they become orphaned.
    pub async fn remove_task(&self, id: &TaskId) -> Option<Task> {
        self.inner.write().await.tasks.remove(id)
    }

    /// Change a task's status.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task doesn't exist.
    pub async fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<()> {
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
        task.status = status;
        Ok(())
    }

    /// Declare a project that may have no tasks yet
    pub async fn add_project(&self, project_id: ProjectId) {
        self.inner.write().await.projects.insert(project_id);
    }

    /// All tasks, ordered by ID
    pub async fn all_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.inner.read().await.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        tasks
    }

    /// Number of tasks
    pub async fn len(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    /// Whether the store holds no tasks
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.tasks.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        Ok(self.inner.read().await.tasks.get(id).cloned())
    }

    async fn list_tasks_by_project(&self, project_id: &ProjectId) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|task| &task.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tasks)
    }
}

#[async_trait]
impl ProjectStore for InMemoryTaskStore {
    async fn project_exists(&self, project_id: &ProjectId) -> Result<bool> {
        Ok(self.inner.read().await.knows_project(project_id))
    }
}
