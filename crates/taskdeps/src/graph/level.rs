//! Topological depth ("level") per task.
//!
//! `level(t) = 0` when `t` has no dependencies, otherwise
//! `1 + max(level(d))` over its dependencies. One memo table per computation
//! keeps shared sub-dependencies from being recomputed.
//!
//! If the snapshot contains a cycle, a node reached again while it is still on
//! the recursion path contributes `0` instead of recursing. The resulting
//! levels are finite but not meaningful, and [`LevelTable::is_degraded`]
//! reports that this happened.

use super::snapshot::GraphSnapshot;
use crate::domain::{EdgeId, TaskId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use tracing::warn;

/// Levels for every task in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelTable {
    levels: HashMap<TaskId, usize>,
    degraded: bool,
}

impl LevelTable {
    /// Compute levels for every task in `snapshot`.
    pub fn compute(snapshot: &GraphSnapshot) -> Self {
        let graph = snapshot.graph();
        let mut pass = LevelPass {
            graph,
            memo: vec![None; graph.node_count()],
            on_path: vec![false; graph.node_count()],
            degraded: false,
        };

        let levels = graph
            .node_indices()
            .map(|node| (graph[node].clone(), pass.level_of(node)))
            .collect();

        if pass.degraded {
            warn!("Level computation hit a cycle; levels are degraded");
        }

        Self {
            levels,
            degraded: pass.degraded,
        }
    }

    /// Level of a task, or `None` if it was not in the snapshot
    pub fn level(&self, task_id: &TaskId) -> Option<usize> {
        self.levels.get(task_id).copied()
    }

    /// Whether the cycle fallback fired during computation
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Highest level in the table (0 when empty)
    pub fn max_level(&self) -> usize {
        self.levels.values().copied().max().unwrap_or(0)
    }

    /// Iterate over `(task, level)` pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, usize)> {
        self.levels.iter().map(|(id, level)| (id, *level))
    }

    /// Number of tasks with a level
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

struct LevelPass<'a> {
    graph: &'a DiGraph<TaskId, EdgeId>,
    memo: Vec<Option<usize>>,
    on_path: Vec<bool>,
    degraded: bool,
}

impl LevelPass<'_> {
    fn level_of(&mut self, node: NodeIndex) -> usize {
        let i = node.index();
        if let Some(level) = self.memo[i] {
            return level;
        }
        if self.on_path[i] {
            self.degraded = true;
            return 0;
        }

        self.on_path[i] = true;
        let graph = self.graph;
        let mut level = 0;
        for dependency in graph.neighbors_directed(node, Direction::Outgoing) {
            level = level.max(self.level_of(dependency) + 1);
        }
        self.on_path[i] = false;

        self.memo[i] = Some(level);
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyEdge;
    use proptest::prelude::*;

    fn snapshot_of(edges: &[(&str, &str)]) -> GraphSnapshot {
        let edges: Vec<DependencyEdge> = edges
            .iter()
            .enumerate()
            .map(|(i, (task, depends_on))| {
                DependencyEdge::new(
                    format!("dep-{i:06}").into(),
                    (*task).into(),
                    (*depends_on).into(),
                )
            })
            .collect();
        GraphSnapshot::from_edges(&edges)
    }

    #[test]
    fn test_chain_levels() {
        let table = LevelTable::compute(&snapshot_of(&[("t2", "t1"), ("t3", "t2")]));

        assert_eq!(table.level(&"t1".into()), Some(0));
        assert_eq!(table.level(&"t2".into()), Some(1));
        assert_eq!(table.level(&"t3".into()), Some(2));
        assert_eq!(table.max_level(), 2);
        assert!(!table.is_degraded());
    }

    #[test]
    fn test_level_uses_longest_chain() {
        // d depends on a directly and through b -> c -> a.
        let table = LevelTable::compute(&snapshot_of(&[
            ("d", "a"),
            ("d", "b"),
            ("b", "c"),
            ("c", "a"),
        ]));

        assert_eq!(table.level(&"a".into()), Some(0));
        assert_eq!(table.level(&"c".into()), Some(1));
        assert_eq!(table.level(&"b".into()), Some(2));
        assert_eq!(table.level(&"d".into()), Some(3));
    }

    #[test]
    fn test_isolated_task_has_level_zero() {
        let tasks = vec![TaskId::new("solo")];
        let snapshot = GraphSnapshot::build(&tasks, &[]);
        let table = LevelTable::compute(&snapshot);

        assert_eq!(table.level(&"solo".into()), Some(0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_unknown_task_has_no_level() {
        let table = LevelTable::compute(&snapshot_of(&[("b", "a")]));
        assert_eq!(table.level(&"z".into()), None);
    }

    #[test]
    fn test_cycle_terminates_and_is_flagged() {
        let table = LevelTable::compute(&snapshot_of(&[("a", "b"), ("b", "c"), ("c", "a")]));

        assert!(table.is_degraded());
        assert_eq!(table.len(), 3);
        assert!(table.iter().all(|(_, level)| level <= 3));
    }

    #[test]
    fn test_empty_snapshot() {
        let table = LevelTable::compute(&GraphSnapshot::default());
        assert!(table.is_empty());
        assert_eq!(table.max_level(), 0);
    }

    fn dag_edges() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (2usize..24).prop_flat_map(|n| {
            let pairs = proptest::collection::vec((0..n, 0..n), 0..n * 3).prop_map(|pairs| {
                // Point every edge from the higher index to the lower one so the
                // graph is acyclic by construction.
                pairs
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| (a.max(b), a.min(b)))
                    .collect::<Vec<_>>()
            });
            (Just(n), pairs)
        })
    }

    proptest! {
        #[test]
        fn prop_levels_follow_recurrence((n, pairs) in dag_edges()) {
            let tasks: Vec<TaskId> = (0..n).map(|i| TaskId::new(format!("t{i:02}"))).collect();
            let edges: Vec<DependencyEdge> = pairs
                .iter()
                .enumerate()
                .map(|(i, (from, to))| {
                    DependencyEdge::new(
                        format!("dep-{i:06}").into(),
                        tasks[*from].clone(),
                        tasks[*to].clone(),
                    )
                })
                .collect();
            let snapshot = GraphSnapshot::build(&tasks, &edges);
            let table = LevelTable::compute(&snapshot);

            prop_assert!(!table.is_degraded());
            for task in &tasks {
                let dependencies = snapshot.dependencies_of(task);
                let expected = dependencies
                    .iter()
                    .filter_map(|d| table.level(d))
                    .max()
                    .map_or(0, |max| max + 1);
                prop_assert_eq!(table.level(task), Some(expected));
            }
        }
    }
}
