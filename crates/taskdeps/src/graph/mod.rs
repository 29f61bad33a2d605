//! Dependency graph engine.
//!
//! # Edge Direction Convention
//!
//! Edges point from **dependent to dependency**:
//!
//! - **Edge source**: the task that has the dependency (the dependent)
//! - **Edge target**: the task being depended upon
//!
//! So "T2 depends on T1" is stored as `T2 -> T1`. Outgoing edges of a node are
//! its dependencies, incoming edges are its dependents.
//!
//! # Components
//!
//! - [`GraphStore`]: owns the edge set and its adjacency index (mutable)
//! - [`cycle_guard`]: write-time check that an edge would not close a loop
//! - [`GraphSnapshot`]: immutable, scope-filtered copy used by every read
//! - [`level`]: topological depth per task
//! - [`ClassificationPolicy`]: blocking / critical flags
//! - [`CycleReport`]: read-side cycle detection, independent of the guard
//! - [`view`]: assembles all of the above into a [`ProjectDependencyView`]
//!
//! The graph is never an object graph. Nodes and edges live in petgraph's
//! index-based adjacency lists with task and edge IDs as weights, and the
//! authoritative edge records sit in an ID-keyed map beside it.

pub mod classify;
pub mod cycle_guard;
pub mod cycles;
pub mod level;
mod snapshot;
mod store;
pub mod view;

pub use classify::{Classification, ClassificationPolicy};
pub use cycles::CycleReport;
pub use level::LevelTable;
pub use snapshot::GraphSnapshot;
pub use store::GraphStore;
pub use view::{IntegrityWarning, ProjectDependencyView, TaskDependencyEntry};
