//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;
use std::path::PathBuf;

use super::validators::{validate_edge_id, validate_project_id, validate_task_id};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Dependent count above which a task is always critical
    ///
    /// Defaults to 2: a task with three or more dependents is critical
    /// whatever its status.
    #[arg(long)]
    pub critical_threshold: Option<usize>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `add` command
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Task that depends on another
    #[arg(value_parser = validate_task_id)]
    pub task: String,

    /// Task being depended on
    #[arg(value_parser = validate_task_id)]
    pub depends_on: String,
}

/// Arguments for the `remove` command
#[derive(Parser, Debug, Clone)]
pub struct RemoveArgs {
    /// Dependency ID to remove (e.g., dep-a1b2c3)
    #[arg(value_parser = validate_edge_id)]
    pub edge_id: String,
}

/// Arguments for the `deps` command
#[derive(Parser, Debug, Clone)]
pub struct DepsArgs {
    /// Task to inspect
    #[arg(value_parser = validate_task_id)]
    pub task: String,
}

/// Arguments for the `view` command
#[derive(Parser, Debug, Clone)]
pub struct ViewArgs {
    /// Project to display
    #[arg(value_parser = validate_project_id)]
    pub project: String,
}

/// Arguments for the `cycles` command
#[derive(Parser, Debug, Clone, Default)]
pub struct CyclesArgs {
    /// Restrict the report to one project
    ///
    /// Without a project, the whole stored edge set is checked.
    #[arg(value_parser = validate_project_id)]
    pub project: Option<String>,
}

/// Arguments for the `import` command
#[derive(Parser, Debug, Clone)]
pub struct ImportArgs {
    /// JSONL file with one dependency edge per line
    pub file: PathBuf,
}

/// Arguments for the `prune` command
#[derive(Parser, Debug, Clone, Default)]
pub struct PruneArgs {
    /// List orphaned dependencies without removing them
    #[arg(long)]
    pub dry_run: bool,
}
