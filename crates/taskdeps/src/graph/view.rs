//! Project-scoped dependency report.
//!
//! Combines levels, classification and the cycle report for one project into
//! a single serializable value. Integrity problems never fail the read; they
//! ride along in [`ProjectDependencyView::warnings`].

use super::classify::ClassificationPolicy;
use super::cycles::CycleReport;
use super::level::LevelTable;
use super::snapshot::GraphSnapshot;
use crate::domain::{DependencyEdge, EdgeId, ProjectId, Task, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// One task in a project view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDependencyEntry {
    /// Task ID
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Task status at read time
    pub status: TaskStatus,

    /// Topological depth (0 = no dependencies)
    pub level: usize,

    /// Has dependents and is not completed
    pub is_blocking: bool,

    /// Threatens several dependents or an immediately-next one
    pub is_critical: bool,

    /// Tasks this one depends on
    pub dependencies: Vec<TaskId>,

    /// Tasks that depend on this one
    pub dependents: Vec<TaskId>,
}

/// Non-fatal problem discovered while reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    /// An edge references a task the task store no longer knows.
    #[serde(rename_all = "camelCase")]
    OrphanedEdge {
        edge_id: EdgeId,
        task_id: TaskId,
        depends_on_task_id: TaskId,
        /// The endpoint that could not be found
        missing: TaskId,
    },

    /// Levels were computed over a cyclic graph and are not meaningful.
    #[serde(rename_all = "camelCase")]
    DegradedLevels { cycle_count: usize },
}

impl IntegrityWarning {
    /// Warning for `edge` whose endpoint `missing` is gone
    pub fn orphaned(edge: &DependencyEdge, missing: TaskId) -> Self {
        Self::OrphanedEdge {
            edge_id: edge.id.clone(),
            task_id: edge.task_id.clone(),
            depends_on_task_id: edge.depends_on_task_id.clone(),
            missing,
        }
    }
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanedEdge {
                edge_id,
                task_id,
                depends_on_task_id,
                missing,
            } => write!(
                f,
                "Orphaned dependency {edge_id} ({task_id} -> {depends_on_task_id}): task {missing} not found"
            ),
            Self::DegradedLevels { cycle_count } => write!(
                f,
                "Levels computed over {cycle_count} cycle(s) and may be inaccurate"
            ),
        }
    }
}

/// Dependency report for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDependencyView {
    /// Project the view covers
    pub project_id: ProjectId,

    /// Tasks by descending level, then ascending ID
    pub tasks: Vec<TaskDependencyEntry>,

    /// Cycles among the project's tasks
    pub cycles: CycleReport,

    /// Integrity warnings found during the read
    pub warnings: Vec<IntegrityWarning>,
}

impl ProjectDependencyView {
    /// Assemble the view for `tasks` over `snapshot`.
    ///
    /// `snapshot` must be scoped to the same tasks. `warnings` carries
    /// anything the caller already found (orphaned edges); a degraded level
    /// computation is appended here.
    pub fn assemble(
        project_id: ProjectId,
        tasks: &[Task],
        snapshot: &GraphSnapshot,
        policy: &ClassificationPolicy,
        mut warnings: Vec<IntegrityWarning>,
    ) -> Self {
        let levels = LevelTable::compute(snapshot);
        let cycles = CycleReport::detect(snapshot);

        if levels.is_degraded() {
            warnings.push(IntegrityWarning::DegradedLevels {
                cycle_count: cycles.len(),
            });
        }

        let mut entries: Vec<TaskDependencyEntry> = tasks
            .iter()
            .map(|task| {
                let dependents = snapshot.dependents_of(&task.id);
                let classification = policy.classify(task.status, dependents.len());
                TaskDependencyEntry {
                    id: task.id.clone(),
                    title: task.title.clone(),
                    status: task.status,
                    level: levels.level(&task.id).unwrap_or(0),
                    is_blocking: classification.is_blocking,
                    is_critical: classification.is_critical,
                    dependencies: snapshot.dependencies_of(&task.id),
                    dependents,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            Reverse(a.level)
                .cmp(&Reverse(b.level))
                .then_with(|| a.id.cmp(&b.id))
        });

        Self {
            project_id,
            tasks: entries,
            cycles,
            warnings,
        }
    }

    /// Look up a task's entry
    pub fn entry(&self, task_id: &TaskId) -> Option<&TaskDependencyEntry> {
        self.tasks.iter().find(|entry| &entry.id == task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task::new(id, "p1", status, format!("Task {id}"))
    }

    fn edge(id: &str, task: &str, depends_on: &str) -> DependencyEdge {
        DependencyEdge::new(id.into(), task.into(), depends_on.into())
    }

    fn view(tasks: &[Task], edges: &[DependencyEdge]) -> ProjectDependencyView {
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
        let snapshot = GraphSnapshot::build(&ids, edges);
        ProjectDependencyView::assemble(
            "p1".into(),
            tasks,
            &snapshot,
            &ClassificationPolicy::default(),
            Vec::new(),
        )
    }

    #[test]
    fn test_tasks_ordered_by_descending_level_then_id() {
        let tasks = vec![
            task("t1", TaskStatus::Completed),
            task("t2", TaskStatus::InProgress),
            task("t3", TaskStatus::Todo),
            task("a0", TaskStatus::Todo),
        ];
        let result = view(
            &tasks,
            &[edge("dep-000001", "t2", "t1"), edge("dep-000002", "t3", "t2")],
        );

        let order: Vec<(&str, usize)> = result
            .tasks
            .iter()
            .map(|e| (e.id.as_str(), e.level))
            .collect();
        assert_eq!(order, vec![("t3", 2), ("t2", 1), ("a0", 0), ("t1", 0)]);
        assert!(result.cycles.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_entries_carry_classification() {
        let tasks = vec![
            task("hub", TaskStatus::InProgress),
            task("a", TaskStatus::Todo),
            task("b", TaskStatus::Todo),
            task("c", TaskStatus::Todo),
            task("done", TaskStatus::Completed),
        ];
        let result = view(
            &tasks,
            &[
                edge("dep-000001", "a", "hub"),
                edge("dep-000002", "b", "hub"),
                edge("dep-000003", "c", "hub"),
                edge("dep-000004", "a", "done"),
            ],
        );

        let hub = result.entry(&"hub".into()).unwrap();
        assert!(hub.is_blocking);
        assert!(hub.is_critical);
        assert_eq!(hub.dependents.len(), 3);

        let done = result.entry(&"done".into()).unwrap();
        assert!(!done.is_blocking);
        assert!(!done.is_critical);

        let a = result.entry(&"a".into()).unwrap();
        assert_eq!(a.dependencies, vec![TaskId::new("done"), TaskId::new("hub")]);
        assert!(!a.is_blocking);
    }

    #[test]
    fn test_cycle_adds_degraded_warning() {
        let tasks = vec![
            task("a", TaskStatus::Todo),
            task("b", TaskStatus::Todo),
            task("c", TaskStatus::Todo),
        ];
        let result = view(
            &tasks,
            &[
                edge("dep-000001", "a", "b"),
                edge("dep-000002", "b", "c"),
                edge("dep-000003", "c", "a"),
            ],
        );

        assert_eq!(result.cycles.len(), 1);
        assert_eq!(
            result.warnings,
            vec![IntegrityWarning::DegradedLevels { cycle_count: 1 }]
        );
        assert_eq!(result.tasks.len(), 3);
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let tasks = vec![task("t1", TaskStatus::Todo), task("t2", TaskStatus::Todo)];
        let result = view(&tasks, &[edge("dep-000001", "t2", "t1")]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["projectId"], "p1");
        assert_eq!(json["tasks"][0]["id"], "t2");
        assert_eq!(json["tasks"][1]["isBlocking"], true);
        assert_eq!(json["tasks"][1]["isCritical"], true);
        assert_eq!(json["cycles"], serde_json::json!([]));
    }

    #[test]
    fn test_orphan_warning_shape() {
        let warning =
            IntegrityWarning::orphaned(&edge("dep-000001", "t2", "gone"), TaskId::new("gone"));
        let json = serde_json::to_value(&warning).unwrap();

        assert_eq!(json["kind"], "orphaned_edge");
        assert_eq!(json["edgeId"], "dep-000001");
        assert_eq!(json["missing"], "gone");
        assert!(warning.to_string().contains("task gone not found"));
    }
}
