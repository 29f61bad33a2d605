//! The dependency API.
//!
//! [`DependencyService`] is the only mutation entry point for dependency
//! edges. It validates requests against the task store, runs the cycle guard
//! and writes to the [`GraphStore`], all under one exclusive lock so that two
//! concurrent requests cannot both pass the cycle check against a stale graph.
//!
//! Reads take the shared lock just long enough to snapshot the graph, then
//! compute levels, classification and cycles without holding it.
//!
//! # Example
//!
//! ```
//! use taskdeps::domain::{Task, TaskStatus};
//! use taskdeps::service::DependencyService;
//! use taskdeps::storage::InMemoryTaskStore;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> taskdeps::error::Result<()> {
//!     let tasks = InMemoryTaskStore::from_tasks([
//!         Task::new("t1", "p1", TaskStatus::Todo, "Schema"),
//!         Task::new("t2", "p1", TaskStatus::Todo, "Migrations"),
//!     ]);
//!     let service = DependencyService::in_memory(tasks);
//!
//!     service.add_dependency(&"t2".into(), &"t1".into()).await?;
//!
//!     let view = service.project_dependency_view(&"p1".into()).await?;
//!     assert_eq!(view.tasks[0].id.as_str(), "t2");
//!     assert_eq!(view.tasks[0].level, 1);
//!     Ok(())
//! }
//! ```

use crate::domain::{DependencyEdge, EdgeId, ProjectId, Task, TaskId};
use crate::error::{Error, Result};
use crate::graph::cycle_guard;
use crate::graph::{
    ClassificationPolicy, CycleReport, GraphSnapshot, GraphStore, IntegrityWarning, LevelTable,
    ProjectDependencyView,
};
use crate::storage::jsonl;
use crate::storage::{InMemoryTaskStore, LoadWarning, ProjectStore, TaskStore};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Validated access to the dependency graph.
///
/// Cheap to clone; clones share the same graph and collaborators.
#[derive(Clone)]
pub struct DependencyService {
    graph: Arc<RwLock<GraphStore>>,
    tasks: Arc<dyn TaskStore>,
    projects: Arc<dyn ProjectStore>,
    policy: ClassificationPolicy,
    persist_path: Option<PathBuf>,

    /// Serializes saves so an older snapshot never overwrites a newer one
    persist_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for DependencyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyService")
            .field("policy", &self.policy)
            .field("persist_path", &self.persist_path)
            .field("tasks", &"<dyn TaskStore>")
            .field("projects", &"<dyn ProjectStore>")
            .finish()
    }
}

impl DependencyService {
    /// Create a service over an existing graph and collaborators
    pub fn new(
        graph: GraphStore,
        tasks: Arc<dyn TaskStore>,
        projects: Arc<dyn ProjectStore>,
    ) -> Self {
        Self {
            graph: Arc::new(RwLock::new(graph)),
            tasks,
            projects,
            policy: ClassificationPolicy::default(),
            persist_path: None,
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a service with an empty graph over an in-memory task store
    pub fn in_memory(store: InMemoryTaskStore) -> Self {
        Self::new(GraphStore::new(), Arc::new(store.clone()), Arc::new(store))
    }

    /// Use a non-default classification policy
    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Persist edges to `path` on [`save`](Self::save)
    pub fn with_persistence(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }

    /// The classification policy in effect
    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }

    /// Where edges are persisted, if anywhere
    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    // ========== Mutations ==========

    /// Record that `task_id` depends on `depends_on`.
    ///
    /// Checks run in order and the first failure wins:
    ///
    /// 1. `Error::SelfDependency` if both IDs are equal
    /// 2. `Error::TaskNotFound` if either task is unknown to the task store
    /// 3. `Error::DuplicateEdge` if the pair is already stored
    /// 4. `Error::CycleDetected` if the edge would close a loop through
    ///    live tasks; orphaned edges are ignored
    ///
    /// Steps 3 and 4 and the insert run under the exclusive graph lock.
    /// On any error the graph is unchanged.
    pub async fn add_dependency(
        &self,
        task_id: &TaskId,
        depends_on: &TaskId,
    ) -> Result<DependencyEdge> {
        if task_id == depends_on {
            return Err(Error::SelfDependency(task_id.clone()));
        }

        for id in [task_id, depends_on] {
            if !self.tasks.task_exists(id).await? {
                return Err(Error::TaskNotFound(id.clone()));
            }
        }

        let mut graph = self.graph.write().await;

        if let Some(existing) = graph.find_edge(task_id, depends_on) {
            return Err(Error::DuplicateEdge {
                task_id: task_id.clone(),
                depends_on: depends_on.clone(),
                existing: existing.id.clone(),
            });
        }

        // Orphaned edges must not close a loop, so route around tasks the
        // task store no longer knows and retry until the path is all live.
        let mut known = HashMap::new();
        let mut deleted = HashSet::new();
        while let Some(path) =
            cycle_guard::cycle_path_avoiding(&graph, task_id, depends_on, &deleted)
        {
            let before = deleted.len();
            for id in &path {
                if !self.cached_exists(&mut known, id).await? {
                    deleted.insert(id.clone());
                }
            }
            if deleted.len() == before {
                debug!(%task_id, %depends_on, ?path, "Rejected dependency that would close a cycle");
                return Err(Error::CycleDetected {
                    task_id: task_id.clone(),
                    depends_on: depends_on.clone(),
                    path,
                });
            }
        }

        let id = graph.next_edge_id(task_id, depends_on)?;
        let edge = DependencyEdge::new(id, task_id.clone(), depends_on.clone());
        graph.add_edge(edge.clone())?;

        debug!(edge_id = %edge.id, %task_id, %depends_on, "Added dependency");
        Ok(edge)
    }

    /// Delete a dependency by edge ID, returning the removed edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::EdgeNotFound` if no edge has this ID; the graph is
    /// unchanged.
    pub async fn remove_dependency(&self, edge_id: &EdgeId) -> Result<DependencyEdge> {
        let edge = self.graph.write().await.remove_edge(edge_id)?;
        debug!(%edge_id, task_id = %edge.task_id, depends_on = %edge.depends_on_task_id, "Removed dependency");
        Ok(edge)
    }

    /// Load edges without cycle checks.
    ///
    /// This is the bulk import path. Self-dependencies and duplicates are
    /// skipped and reported; cycles are accepted and will show up in cycle
    /// reports.
    pub async fn import(&self, edges: Vec<DependencyEdge>) -> Vec<LoadWarning> {
        let rejected = self.graph.write().await.import_edges(edges);

        rejected
            .iter()
            .map(|(edge, error)| {
                let warning = LoadWarning::from_rejection(edge, error);
                warn!("{warning}");
                warning
            })
            .collect()
    }

    /// Remove every edge with an endpoint the task store no longer knows.
    ///
    /// Returns the removed edges, ordered by ID.
    pub async fn prune_orphaned_edges(&self) -> Result<Vec<DependencyEdge>> {
        let orphaned = self.orphaned_edges().await?;

        let mut removed = Vec::with_capacity(orphaned.len());
        let mut graph = self.graph.write().await;
        for edge in orphaned {
            // Someone may have removed it since the read above.
            if let Ok(edge) = graph.remove_edge(&edge.id) {
                removed.push(edge);
            }
        }
        drop(graph);

        if !removed.is_empty() {
            info!(count = removed.len(), "Pruned orphaned dependencies");
        }
        Ok(removed)
    }

    // ========== Reads ==========

    /// Edges with at least one endpoint the task store no longer knows,
    /// ordered by ID
    pub async fn orphaned_edges(&self) -> Result<Vec<DependencyEdge>> {
        let mut known: HashMap<TaskId, bool> = HashMap::new();
        let mut orphaned = Vec::new();

        for edge in self.edges().await {
            let mut live = true;
            for id in [&edge.task_id, &edge.depends_on_task_id] {
                if !self.cached_exists(&mut known, id).await? {
                    live = false;
                }
            }
            if !live {
                orphaned.push(edge);
            }
        }

        Ok(orphaned)
    }

    /// Tasks that `task_id` depends on
    pub async fn dependencies_of(&self, task_id: &TaskId) -> BTreeSet<TaskId> {
        self.graph.read().await.dependencies_of(task_id)
    }

    /// Tasks that depend on `task_id`
    pub async fn dependents_of(&self, task_id: &TaskId) -> BTreeSet<TaskId> {
        self.graph.read().await.dependents_of(task_id)
    }

    /// Look up an edge by ID
    pub async fn edge(&self, edge_id: &EdgeId) -> Option<DependencyEdge> {
        self.graph.read().await.edge(edge_id).cloned()
    }

    /// Every stored edge, ordered by ID
    pub async fn edges(&self) -> Vec<DependencyEdge> {
        self.graph
            .read()
            .await
            .edges()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Number of stored edges
    pub async fn edge_count(&self) -> usize {
        self.graph.read().await.len()
    }

    /// Edges whose endpoints both belong to `project_id`, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProjectNotFound` if the project doesn't exist.
    pub async fn edges_for_project(&self, project_id: &ProjectId) -> Result<Vec<DependencyEdge>> {
        let tasks = self.project_tasks(project_id).await?;
        let members: HashSet<TaskId> = tasks.into_iter().map(|task| task.id).collect();
        Ok(self.graph.read().await.edges_for_project(&members))
    }

    /// Level of a task within its project.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task doesn't exist.
    pub async fn level_of(&self, task_id: &TaskId) -> Result<usize> {
        let task = self
            .tasks
            .get_task(task_id)
            .await?
            .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
        let tasks = self.tasks.list_tasks_by_project(&task.project_id).await?;
        let (snapshot, _) = self.snapshot_of(&tasks).await;

        Ok(LevelTable::compute(&snapshot).level(task_id).unwrap_or(0))
    }

    /// Cycles among the tasks of `project_id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProjectNotFound` if the project doesn't exist.
    pub async fn project_cycles(&self, project_id: &ProjectId) -> Result<CycleReport> {
        let tasks = self.project_tasks(project_id).await?;
        let (snapshot, _) = self.snapshot_of(&tasks).await;
        Ok(CycleReport::detect(&snapshot))
    }

    /// Cycles across the whole stored edge set.
    ///
    /// Orphaned edges are left out, matching what the cycle guard and the
    /// project views see.
    pub async fn cycle_report(&self) -> Result<CycleReport> {
        let orphaned: HashSet<EdgeId> = self
            .orphaned_edges()
            .await?
            .into_iter()
            .map(|edge| edge.id)
            .collect();
        let edges: Vec<DependencyEdge> = self
            .edges()
            .await
            .into_iter()
            .filter(|edge| !orphaned.contains(&edge.id))
            .collect();
        Ok(CycleReport::detect(&GraphSnapshot::from_edges(&edges)))
    }

    /// Full dependency report for a project.
    ///
    /// Orphaned edges touching the project are excluded and reported as
    /// warnings; cycles are reported, never raised.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProjectNotFound` if the project doesn't exist.
    pub async fn project_dependency_view(
        &self,
        project_id: &ProjectId,
    ) -> Result<ProjectDependencyView> {
        let tasks = self.project_tasks(project_id).await?;
        let (snapshot, boundary) = self.snapshot_of(&tasks).await;
        let warnings = self.orphan_warnings(&snapshot, &boundary).await?;

        Ok(ProjectDependencyView::assemble(
            project_id.clone(),
            &tasks,
            &snapshot,
            &self.policy,
            warnings,
        ))
    }

    // ========== Persistence ==========

    /// Write the edge set to the persistence path, if one is configured
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.persist_path else {
            debug!("No persistence path configured, skipping save");
            return Ok(());
        };

        let _guard = self.persist_lock.lock().await;
        let edges = self.edges().await;
        jsonl::save_edges(path, &edges).await
    }

    /// Replace the in-memory graph with the persisted one.
    ///
    /// Returns load warnings. Without a persistence path this is a no-op.
    pub async fn reload(&self) -> Result<Vec<LoadWarning>> {
        let Some(path) = &self.persist_path else {
            return Ok(Vec::new());
        };

        let (store, warnings) = jsonl::load_edges(path).await?;
        *self.graph.write().await = store;
        Ok(warnings)
    }

    // ========== Helpers ==========

    async fn project_tasks(&self, project_id: &ProjectId) -> Result<Vec<Task>> {
        if !self.projects.project_exists(project_id).await? {
            return Err(Error::ProjectNotFound(project_id.clone()));
        }
        self.tasks.list_tasks_by_project(project_id).await
    }

    async fn snapshot_of(&self, tasks: &[Task]) -> (GraphSnapshot, Vec<DependencyEdge>) {
        let scope: HashSet<TaskId> = tasks.iter().map(|task| task.id.clone()).collect();
        let snapshot = self.graph.read().await.snapshot(&scope);
        let boundary = snapshot.boundary_edges().to_vec();
        (snapshot, boundary)
    }

    /// Boundary edges whose outside endpoint is gone from the task store.
    ///
    /// Boundary edges to live tasks of other projects are legitimate and are
    /// simply left out of the view.
    async fn orphan_warnings(
        &self,
        snapshot: &GraphSnapshot,
        boundary: &[DependencyEdge],
    ) -> Result<Vec<IntegrityWarning>> {
        let mut known = HashMap::new();
        let mut warnings = Vec::new();

        for edge in boundary {
            let outside = if snapshot.contains(&edge.task_id) {
                &edge.depends_on_task_id
            } else {
                &edge.task_id
            };

            if !self.cached_exists(&mut known, outside).await? {
                let warning = IntegrityWarning::orphaned(edge, outside.clone());
                warn!("{warning}");
                warnings.push(warning);
            }
        }

        Ok(warnings)
    }

    async fn cached_exists(&self, known: &mut HashMap<TaskId, bool>, id: &TaskId) -> Result<bool> {
        if let Some(&exists) = known.get(id) {
            return Ok(exists);
        }
        let exists = self.tasks.task_exists(id).await?;
        known.insert(id.clone(), exists);
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;

    fn service_with(ids: &[&str]) -> (DependencyService, InMemoryTaskStore) {
        let store = InMemoryTaskStore::from_tasks(
            ids.iter()
                .map(|id| Task::new(*id, "p1", TaskStatus::Todo, format!("Task {id}"))),
        );
        (DependencyService::in_memory(store.clone()), store)
    }

    #[tokio::test]
    async fn test_self_dependency_checked_before_existence() {
        let (service, _) = service_with(&[]);

        let result = service.add_dependency(&"ghost".into(), &"ghost".into()).await;
        assert!(matches!(result, Err(Error::SelfDependency(_))));
    }

    #[tokio::test]
    async fn test_unknown_task_is_rejected() {
        let (service, _) = service_with(&["a"]);

        let result = service.add_dependency(&"a".into(), &"missing".into()).await;
        match result {
            Err(Error::TaskNotFound(id)) => assert_eq!(id, TaskId::new("missing")),
            other => panic!("Expected TaskNotFound, got {other:?}"),
        }
        assert_eq!(service.edge_count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_reports_existing_edge() {
        let (service, _) = service_with(&["a", "b"]);
        let first = service.add_dependency(&"b".into(), &"a".into()).await.unwrap();

        let result = service.add_dependency(&"b".into(), &"a".into()).await;
        match result {
            Err(Error::DuplicateEdge { existing, .. }) => assert_eq!(existing, first.id),
            other => panic!("Expected DuplicateEdge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cycle_error_carries_path() {
        let (service, _) = service_with(&["t1", "t2", "t3"]);
        service.add_dependency(&"t2".into(), &"t1".into()).await.unwrap();
        service.add_dependency(&"t3".into(), &"t2".into()).await.unwrap();

        let error = service
            .add_dependency(&"t1".into(), &"t3".into())
            .await
            .unwrap_err();

        assert_eq!(error.code(), "CYCLE_DETECTED");
        assert!(error.to_string().contains("t1 -> t3 -> t2 -> t1"));
        assert_eq!(service.edge_count().await, 2);
    }

    #[tokio::test]
    async fn test_level_of_follows_project_scope() {
        let (service, _) = service_with(&["t1", "t2", "t3"]);
        service.add_dependency(&"t2".into(), &"t1".into()).await.unwrap();
        service.add_dependency(&"t3".into(), &"t2".into()).await.unwrap();

        assert_eq!(service.level_of(&"t3".into()).await.unwrap(), 2);
        assert!(matches!(
            service.level_of(&"nope".into()).await,
            Err(Error::TaskNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_project_is_rejected() {
        let (service, _) = service_with(&["a"]);

        let result = service.project_dependency_view(&"nope".into()).await;
        assert!(matches!(result, Err(Error::ProjectNotFound(_))));
    }

    #[tokio::test]
    async fn test_save_without_path_is_noop() {
        let (service, _) = service_with(&["a", "b"]);
        service.add_dependency(&"b".into(), &"a".into()).await.unwrap();

        service.save().await.unwrap();
        assert!(service.reload().await.unwrap().is_empty());
        assert_eq!(service.edge_count().await, 1);
    }
}
