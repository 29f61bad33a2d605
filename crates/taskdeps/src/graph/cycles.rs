//! Read-side cycle detection.
//!
//! The cycle guard keeps the API path acyclic, but edges can also arrive by
//! bulk import or manual edits. [`CycleReport::detect`] runs an independent
//! three-color depth-first search over a snapshot and lists every loop found
//! through a back edge.

use super::snapshot::GraphSnapshot;
use crate::domain::{EdgeId, TaskId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not visited yet
    White,
    /// On the current DFS path
    Gray,
    /// Fully explored
    Black,
}

/// Distinct cycles present in a snapshot.
///
/// Each cycle lists its tasks in edge order (`c[0]` depends on `c[1]`, and so
/// on, with the last task depending on `c[0]`), rotated to start at its
/// smallest task ID. Cycles are sorted and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleReport {
    cycles: Vec<Vec<TaskId>>,
}

impl CycleReport {
    /// Find the cycles in `snapshot`.
    pub fn detect(snapshot: &GraphSnapshot) -> Self {
        let graph = snapshot.graph();
        let mut search = CycleSearch {
            graph,
            color: vec![Color::White; graph.node_count()],
            path: Vec::new(),
            found: BTreeSet::new(),
        };

        for node in graph.node_indices() {
            if search.color[node.index()] == Color::White {
                search.visit(node);
            }
        }

        let cycles: Vec<_> = search.found.into_iter().collect();
        if !cycles.is_empty() {
            warn!(count = cycles.len(), "Dependency cycles present in graph");
        }
        Self { cycles }
    }

    /// The cycles, in sorted order
    pub fn cycles(&self) -> &[Vec<TaskId>] {
        &self.cycles
    }

    /// Whether `task_id` sits on any reported cycle
    pub fn involves(&self, task_id: &TaskId) -> bool {
        self.cycles.iter().any(|cycle| cycle.contains(task_id))
    }

    /// Number of cycles
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Whether the graph is acyclic
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}

struct CycleSearch<'a> {
    graph: &'a DiGraph<TaskId, EdgeId>,
    color: Vec<Color>,
    path: Vec<NodeIndex>,
    found: BTreeSet<Vec<TaskId>>,
}

impl CycleSearch<'_> {
    fn visit(&mut self, node: NodeIndex) {
        self.color[node.index()] = Color::Gray;
        self.path.push(node);

        let graph = self.graph;
        let mut next: Vec<NodeIndex> = graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        next.sort_by(|a, b| graph[*a].cmp(&graph[*b]));

        for target in next {
            match self.color[target.index()] {
                Color::White => self.visit(target),
                Color::Gray => self.record_back_edge(target),
                Color::Black => {}
            }
        }

        self.path.pop();
        self.color[node.index()] = Color::Black;
    }

    fn record_back_edge(&mut self, target: NodeIndex) {
        let Some(start) = self.path.iter().rposition(|&n| n == target) else {
            return;
        };
        let cycle: Vec<TaskId> = self.path[start..]
            .iter()
            .map(|&n| self.graph[n].clone())
            .collect();
        self.found.insert(canonical(cycle));
    }
}

/// Rotate a cycle so it starts at its smallest task ID.
fn canonical(mut cycle: Vec<TaskId>) -> Vec<TaskId> {
    if let Some(min) = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    {
        cycle.rotate_left(min);
    }
    cycle
}
