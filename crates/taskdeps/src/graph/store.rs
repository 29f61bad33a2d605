//! Authoritative edge storage with an incrementally maintained adjacency index.

use super::snapshot::GraphSnapshot;
use crate::domain::{DependencyEdge, EdgeId, TaskId};
use crate::error::{Error, Result};
use crate::id_generation::EdgeIdGenerator;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredEdge {
    edge: DependencyEdge,
    index: EdgeIndex,
}

/// Owns the dependency edge set.
///
/// This is pure storage: it never consults task status or the cycle guard.
/// It does refuse edges that break the structural invariants every path must
/// uphold (self-dependency, duplicate pair, duplicate ID).
///
/// # Graph Representation
///
/// `graph` is a `StableDiGraph` so that removing nodes and edges does not
/// invalidate the indices held in `node_map` and `edges`. A task has a node
/// only while it participates in at least one edge.
#[derive(Debug, Default)]
pub struct GraphStore {
    /// Adjacency index. Node weights are task IDs, edge weights are edge IDs.
    graph: StableDiGraph<TaskId, EdgeId>,

    /// Task ID to graph node.
    node_map: HashMap<TaskId, NodeIndex>,

    /// Edge records keyed by ID, each with its position in `graph`.
    edges: HashMap<EdgeId, StoredEdge>,

    id_generator: EdgeIdGenerator,
}

impl GraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh edge ID for `task_id -> depends_on`.
    ///
    /// # Errors
    ///
    /// Returns `Error::IdGeneration` if no unique ID could be produced.
    pub fn next_edge_id(&mut self, task_id: &TaskId, depends_on: &TaskId) -> Result<EdgeId> {
        Ok(self.id_generator.generate(task_id, depends_on)?)
    }

    /// Insert an edge.
    ///
    /// # Errors
    ///
    /// - `Error::SelfDependency` if both endpoints are the same task
    /// - `Error::DuplicateEdge` if the pair or the edge ID is already stored
    pub fn add_edge(&mut self, edge: DependencyEdge) -> Result<()> {
        if edge.is_self_dependency() {
            return Err(Error::SelfDependency(edge.task_id));
        }

        if let Some(existing) = self.find_edge(&edge.task_id, &edge.depends_on_task_id) {
            return Err(Error::DuplicateEdge {
                task_id: edge.task_id.clone(),
                depends_on: edge.depends_on_task_id.clone(),
                existing: existing.id.clone(),
            });
        }

        if self.edges.contains_key(&edge.id) {
            return Err(Error::DuplicateEdge {
                task_id: edge.task_id.clone(),
                depends_on: edge.depends_on_task_id.clone(),
                existing: edge.id,
            });
        }

        let from = self.ensure_node(&edge.task_id);
        let to = self.ensure_node(&edge.depends_on_task_id);
        let index = self.graph.add_edge(from, to, edge.id.clone());

        self.id_generator.register(&edge.id);
        self.edges.insert(edge.id.clone(), StoredEdge { edge, index });

        Ok(())
    }

    /// Remove an edge by ID, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `Error::EdgeNotFound` if no edge has this ID.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<DependencyEdge> {
        let stored = self
            .edges
            .remove(id)
            .ok_or_else(|| Error::EdgeNotFound(id.clone()))?;

        self.graph.remove_edge(stored.index);
        self.release_if_isolated(&stored.edge.task_id);
        self.release_if_isolated(&stored.edge.depends_on_task_id);

        Ok(stored.edge)
    }

    /// Load edges without any cycle check.
    ///
    /// This is the path for data that bypasses the validated API (bulk
    /// imports, manual fixes). Edges that break a structural invariant are
    /// skipped and returned alongside the error that rejected them.
    pub fn import_edges<I>(&mut self, edges: I) -> Vec<(DependencyEdge, Error)>
    where
        I: IntoIterator<Item = DependencyEdge>,
    {
        let mut imported = 0usize;
        let mut rejected = Vec::new();

        for edge in edges {
            match self.add_edge(edge.clone()) {
                Ok(()) => imported += 1,
                Err(e) => rejected.push((edge, e)),
            }
        }

        debug!(imported, rejected = rejected.len(), "Imported dependency edges");
        rejected
    }

    /// Look up an edge by ID
    pub fn edge(&self, id: &EdgeId) -> Option<&DependencyEdge> {
        self.edges.get(id).map(|stored| &stored.edge)
    }

    /// Look up the edge `task_id -> depends_on`, if present
    pub fn find_edge(&self, task_id: &TaskId, depends_on: &TaskId) -> Option<&DependencyEdge> {
        let from = self.node_map.get(task_id)?;
        let to = self.node_map.get(depends_on)?;
        let index = self.graph.find_edge(*from, *to)?;
        let id = self.graph.edge_weight(index)?;
        self.edge(id)
    }

    /// Whether the pair `task_id -> depends_on` is stored
    pub fn contains_pair(&self, task_id: &TaskId, depends_on: &TaskId) -> bool {
        self.find_edge(task_id, depends_on).is_some()
    }

    /// Tasks that `task_id` depends on
    pub fn dependencies_of(&self, task_id: &TaskId) -> BTreeSet<TaskId> {
        self.neighbors(task_id, Direction::Outgoing)
    }

    /// Tasks that depend on `task_id`
    pub fn dependents_of(&self, task_id: &TaskId) -> BTreeSet<TaskId> {
        self.neighbors(task_id, Direction::Incoming)
    }

    /// All edges, ordered by ID
    pub fn edges(&self) -> Vec<&DependencyEdge> {
        let mut edges: Vec<_> = self.edges.values().map(|stored| &stored.edge).collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));
        edges
    }

    /// Edges whose endpoints are both members of a project, ordered by ID.
    ///
    /// Membership comes from the task store; the store itself knows nothing
    /// about projects.
    pub fn edges_for_project(&self, members: &HashSet<TaskId>) -> Vec<DependencyEdge> {
        self.edges()
            .into_iter()
            .filter(|edge| {
                members.contains(&edge.task_id) && members.contains(&edge.depends_on_task_id)
            })
            .cloned()
            .collect()
    }

    /// Build an immutable snapshot restricted to `scope`.
    ///
    /// Edges with exactly one endpoint in scope are kept aside as boundary
    /// edges so callers can tell cross-scope links from orphans.
    pub fn snapshot(&self, scope: &HashSet<TaskId>) -> GraphSnapshot {
        GraphSnapshot::build(scope, self.edges.values().map(|stored| &stored.edge))
    }

    /// Number of stored edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the store holds no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub(crate) fn graph(&self) -> &StableDiGraph<TaskId, EdgeId> {
        &self.graph
    }

    pub(crate) fn node_index(&self, task_id: &TaskId) -> Option<NodeIndex> {
        self.node_map.get(task_id).copied()
    }

    fn neighbors(&self, task_id: &TaskId, direction: Direction) -> BTreeSet<TaskId> {
        self.node_map
            .get(task_id)
            .map(|&node| {
                self.graph
                    .neighbors_directed(node, direction)
                    .map(|neighbor| self.graph[neighbor].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn ensure_node(&mut self, task_id: &TaskId) -> NodeIndex {
        if let Some(&node) = self.node_map.get(task_id) {
            return node;
        }
        let node = self.graph.add_node(task_id.clone());
        self.node_map.insert(task_id.clone(), node);
        node
    }

    fn release_if_isolated(&mut self, task_id: &TaskId) {
        let Some(&node) = self.node_map.get(task_id) else {
            return;
        };
        if self.graph.neighbors_undirected(node).next().is_none() {
            self.graph.remove_node(node);
            self.node_map.remove(task_id);
        }
    }
}
