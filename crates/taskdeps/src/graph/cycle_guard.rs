//! Write-time cycle prevention.
//!
//! Adding `task -> depends_on` closes a loop exactly when `task` is already
//! reachable from `depends_on` through existing depends-on edges. The guard
//! answers that with a depth-first traversal from `depends_on` and, when the
//! answer is yes, hands back the offending path so the rejection can name it.
//!
//! Callers can pass tasks to route around. The service uses this to keep
//! edges of deleted tasks from blocking a legal insert.

use super::store::GraphStore;
use crate::domain::TaskId;
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Whether adding `task_id -> depends_on` would introduce a cycle.
///
/// Tasks with no edges yet cannot close a loop, so unknown endpoints answer
/// `false`. O(V + E) in the reachable part of the graph.
pub fn would_create_cycle(store: &GraphStore, task_id: &TaskId, depends_on: &TaskId) -> bool {
    cycle_path(store, task_id, depends_on).is_some()
}

/// The existing path that `task_id -> depends_on` would close, if any.
///
/// The returned path starts at `depends_on` and ends at the last task before
/// `task_id`, so `task_id`, the path and `task_id` again spell out the loop.
/// A self-dependency yields an empty path.
pub fn cycle_path(store: &GraphStore, task_id: &TaskId, depends_on: &TaskId) -> Option<Vec<TaskId>> {
    cycle_path_avoiding(store, task_id, depends_on, &HashSet::new())
}

/// Like [`cycle_path`], but never walks through a task in `excluded`.
pub fn cycle_path_avoiding(
    store: &GraphStore,
    task_id: &TaskId,
    depends_on: &TaskId,
    excluded: &HashSet<TaskId>,
) -> Option<Vec<TaskId>> {
    if task_id == depends_on {
        return Some(Vec::new());
    }

    let start = store.node_index(depends_on)?;
    let goal = store.node_index(task_id)?;
    let graph = store.graph();

    let mut visited: HashSet<NodeIndex> = graph
        .node_indices()
        .filter(|&node| excluded.contains(&graph[node]))
        .collect();
    let mut predecessor: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut stack = vec![start];
    visited.insert(start);

    while let Some(node) = stack.pop() {
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            if !visited.insert(next) {
                continue;
            }
            predecessor.insert(next, node);
            if next == goal {
                return Some(trace_back(store, &predecessor, start, goal));
            }
            stack.push(next);
        }
    }

    None
}

fn trace_back(
    store: &GraphStore,
    predecessor: &HashMap<NodeIndex, NodeIndex>,
    start: NodeIndex,
    goal: NodeIndex,
) -> Vec<TaskId> {
    let graph = store.graph();
    let mut path = Vec::new();
    let mut current = goal;

    while let Some(&previous) = predecessor.get(&current) {
        path.push(graph[previous].clone());
        if previous == start {
            break;
        }
        current = previous;
    }

    path.reverse();
    path
}
