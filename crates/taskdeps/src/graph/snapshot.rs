use crate::domain::{DependencyEdge, EdgeId, TaskId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

/// Immutable, scope-filtered copy of the dependency graph.
///
/// Every task in scope gets a node, even without edges. Only edges with both
/// endpoints in scope enter the graph; edges with exactly one endpoint in
/// scope are kept as boundary edges.
///
/// Node indices are contiguous, so per-node state in the algorithms built on
/// top can live in plain vectors indexed by `NodeIndex::index()`.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    graph: DiGraph<TaskId, EdgeId>,
    node_map: HashMap<TaskId, NodeIndex>,
    boundary_edges: Vec<DependencyEdge>,
}

impl GraphSnapshot {
    /// Build a snapshot of `edges` restricted to `tasks`.
    pub fn build<'a, T, E>(tasks: T, edges: E) -> Self
    where
        T: IntoIterator<Item = &'a TaskId>,
        E: IntoIterator<Item = &'a DependencyEdge>,
    {
        let scope: BTreeSet<&TaskId> = tasks.into_iter().collect();
        let mut graph = DiGraph::with_capacity(scope.len(), scope.len());
        let mut node_map = HashMap::with_capacity(scope.len());

        for task_id in scope {
            let node = graph.add_node(task_id.clone());
            node_map.insert(task_id.clone(), node);
        }

        let mut edges: Vec<&DependencyEdge> = edges.into_iter().collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));

        let mut boundary_edges = Vec::new();
        for edge in edges {
            match (
                node_map.get(&edge.task_id),
                node_map.get(&edge.depends_on_task_id),
            ) {
                (Some(&from), Some(&to)) => {
                    graph.update_edge(from, to, edge.id.clone());
                }
                (Some(_), None) | (None, Some(_)) => boundary_edges.push(edge.clone()),
                (None, None) => {}
            }
        }

        Self {
            graph,
            node_map,
            boundary_edges,
        }
    }

    /// Build a snapshot whose scope is every endpoint of `edges`.
    pub fn from_edges(edges: &[DependencyEdge]) -> Self {
        let tasks: BTreeSet<TaskId> = edges
            .iter()
            .flat_map(|edge| [edge.task_id.clone(), edge.depends_on_task_id.clone()])
            .collect();
        Self::build(&tasks, edges)
    }

    /// Whether the task is in scope
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.node_map.contains_key(task_id)
    }

    /// Tasks in scope, in ID order
    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.graph.node_weights()
    }

    /// In-scope tasks that `task_id` depends on, sorted
    pub fn dependencies_of(&self, task_id: &TaskId) -> Vec<TaskId> {
        self.neighbors(task_id, Direction::Outgoing)
    }

    /// In-scope tasks that depend on `task_id`, sorted
    pub fn dependents_of(&self, task_id: &TaskId) -> Vec<TaskId> {
        self.neighbors(task_id, Direction::Incoming)
    }

    /// Number of in-scope dependents of `task_id`
    pub fn dependent_count(&self, task_id: &TaskId) -> usize {
        self.node_map
            .get(task_id)
            .map(|&node| {
                self.graph
                    .neighbors_directed(node, Direction::Incoming)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Edges with exactly one endpoint in scope
    pub fn boundary_edges(&self) -> &[DependencyEdge] {
        &self.boundary_edges
    }

    /// Number of tasks in scope
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of in-scope edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn graph(&self) -> &DiGraph<TaskId, EdgeId> {
        &self.graph
    }

    fn neighbors(&self, task_id: &TaskId, direction: Direction) -> Vec<TaskId> {
        let Some(&node) = self.node_map.get(task_id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<TaskId> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        neighbors.sort();
        neighbors
    }
}
