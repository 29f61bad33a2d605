//! JSON Lines persistence.
//!
//! `dependencies.jsonl` holds one [`DependencyEdge`] per line, sorted by edge
//! ID so repeated saves produce stable diffs. `tasks.jsonl` is a read-only
//! export of the surrounding system's tasks, one [`Task`] per line.
//!
//! Loading is resilient: malformed lines and edges that break a structural
//! invariant are skipped and reported as [`LoadWarning`]s. Cycles are not
//! filtered here; loaded data goes through [`GraphStore::import_edges`] and
//! any loop shows up in the read-side cycle report.
//!
//! Saving writes to a temporary file and renames it over the target, so an
//! interrupted save leaves the previous file intact.

use crate::domain::{DependencyEdge, EdgeId, Task, TaskId};
use crate::error::{Error, Result};
use crate::graph::GraphStore;
use crate::storage::InMemoryTaskStore;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::debug;

/// Non-fatal problems found while loading JSONL data.
///
/// The offending line or record is skipped; everything else loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line could not be parsed
    MalformedJson { line_number: usize, error: String },

    /// An edge pointed a task at itself
    SelfDependency { edge_id: EdgeId, task_id: TaskId },

    /// An edge repeated a pair or ID that was already loaded
    DuplicateEdge { edge_id: EdgeId, existing: EdgeId },

    /// An edge was rejected for another reason
    InvalidEdge { edge_id: EdgeId, error: String },

    /// A task ID appeared more than once; the first occurrence wins
    DuplicateTask { task_id: TaskId, line_number: usize },
}

impl LoadWarning {
    /// Convert a rejection from [`GraphStore::import_edges`] into a warning
    pub fn from_rejection(edge: &DependencyEdge, error: &Error) -> Self {
        match error {
            Error::SelfDependency(task_id) => Self::SelfDependency {
                edge_id: edge.id.clone(),
                task_id: task_id.clone(),
            },
            Error::DuplicateEdge { existing, .. } => Self::DuplicateEdge {
                edge_id: edge.id.clone(),
                existing: existing.clone(),
            },
            other => Self::InvalidEdge {
                edge_id: edge.id.clone(),
                error: other.to_string(),
            },
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "Skipped malformed JSON at line {line_number}: {error}")
            }
            Self::SelfDependency { edge_id, task_id } => {
                write!(f, "Skipped self-dependency {edge_id} on task {task_id}")
            }
            Self::DuplicateEdge { edge_id, existing } => {
                write!(f, "Skipped duplicate dependency {edge_id} (already stored as {existing})")
            }
            Self::InvalidEdge { edge_id, error } => {
                write!(f, "Skipped dependency {edge_id}: {error}")
            }
            Self::DuplicateTask {
                task_id,
                line_number,
            } => write!(f, "Skipped duplicate task {task_id} at line {line_number}"),
        }
    }
}

/// Read every parseable record from a JSONL file.
///
/// Blank lines are ignored. A missing file reads as empty.
///
/// Returns `(records, warnings)` where each record is paired with its 1-based
/// line number.
async fn read_resilient<T: DeserializeOwned>(
    path: &Path,
) -> Result<(Vec<(usize, T)>, Vec<LoadWarning>)> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "JSONL file not found, treating as empty");
            return Ok((Vec::new(), Vec::new()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut lines = BufReader::new(file).lines();
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str(trimmed) {
            Ok(record) => records.push((line_number, record)),
            Err(e) => warnings.push(LoadWarning::MalformedJson {
                line_number,
                error: e.to_string(),
            }),
        }
    }

    Ok((records, warnings))
}

/// Read edges from a JSONL file without loading them into a store.
///
/// Used by bulk import, which feeds the result to
/// [`GraphStore::import_edges`] itself.
pub async fn read_edges(path: &Path) -> Result<(Vec<DependencyEdge>, Vec<LoadWarning>)> {
    let (records, warnings) = read_resilient::<DependencyEdge>(path).await?;
    let edges = records.into_iter().map(|(_, edge)| edge).collect();
    Ok((edges, warnings))
}

/// Load a [`GraphStore`] from a dependencies file.
pub async fn load_edges(path: &Path) -> Result<(GraphStore, Vec<LoadWarning>)> {
    let (edges, mut warnings) = read_edges(path).await?;
    let count = edges.len();

    let mut store = GraphStore::new();
    for (edge, error) in store.import_edges(edges) {
        warnings.push(LoadWarning::from_rejection(&edge, &error));
    }

    debug!(
        path = %path.display(),
        parsed = count,
        loaded = store.len(),
        warnings = warnings.len(),
        "Loaded dependency edges"
    );
    Ok((store, warnings))
}

/// Write edges to a JSONL file atomically, sorted by edge ID.
pub async fn save_edges(path: &Path, edges: &[DependencyEdge]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut sorted: Vec<&DependencyEdge> = edges.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let temp_path = path.with_extension("jsonl.tmp");
    let file = File::create(&temp_path).await?;
    let mut writer = BufWriter::new(file);

    for edge in sorted {
        let json = serde_json::to_string(edge)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    drop(writer);

    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), count = edges.len(), "Saved dependency edges");
    Ok(())
}

/// Load an [`InMemoryTaskStore`] from a tasks export.
pub async fn load_tasks(path: &Path) -> Result<(InMemoryTaskStore, Vec<LoadWarning>)> {
    let (records, mut warnings) = read_resilient::<Task>(path).await?;

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(records.len());
    for (line_number, task) in records {
        if !seen.insert(task.id.clone()) {
            warnings.push(LoadWarning::DuplicateTask {
                task_id: task.id,
                line_number,
            });
            continue;
        }
        tasks.push(task);
    }

    debug!(path = %path.display(), count = tasks.len(), "Loaded tasks");
    Ok((InMemoryTaskStore::from_tasks(tasks), warnings))
}
