//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for taskdeps using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `init`: Initialize a new taskdeps workspace
//! - `add`: Record that one task depends on another
//! - `remove`: Delete a dependency by ID
//! - `deps`: Show a task's dependencies and dependents
//! - `view`: Show a project's tasks by level with blocking/critical flags
//! - `cycles`: Report dependency cycles
//! - `import`: Bulk-load dependencies from a JSONL file
//! - `prune`: Remove dependencies whose tasks no longer exist
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! taskdeps add t2 t1
//! taskdeps view p1
//! taskdeps --json cycles p1
//! taskdeps remove dep-a1b2c3
//! ```

mod args;
mod execute;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{
    AddArgs, CyclesArgs, DepsArgs, ImportArgs, InitArgs, PruneArgs, RemoveArgs, ViewArgs,
};

// Re-export validators for external use
pub use validators::{validate_edge_id, validate_project_id, validate_task_id};

/// taskdeps - task dependency graph engine
///
/// Track "task A depends on task B" relationships between project tasks.
/// Dependencies are stored in `.taskdeps/dependencies.jsonl`; tasks are read
/// from `.taskdeps/tasks.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "taskdeps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new taskdeps workspace
    ///
    /// Creates the `.taskdeps/` directory with configuration, an empty task
    /// export and an empty dependency file.
    Init(InitArgs),

    /// Add a dependency between tasks
    ///
    /// Records that TASK depends on DEPENDS_ON. Rejected if it would make a
    /// task depend on itself, repeat an existing dependency or close a cycle.
    Add(AddArgs),

    /// Remove a dependency by ID
    Remove(RemoveArgs),

    /// Show a task's direct dependencies and dependents
    Deps(DepsArgs),

    /// Show a project's dependency view
    ///
    /// Lists tasks from the highest level down, with blocking and critical
    /// flags, detected cycles and integrity warnings.
    View(ViewArgs),

    /// Report dependency cycles
    Cycles(CyclesArgs),

    /// Import dependencies from a JSONL file
    ///
    /// Bypasses the cycle check; any cycles introduced are reported afterwards.
    Import(ImportArgs),

    /// Remove dependencies that reference missing tasks
    Prune(PruneArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Add(args)) => {
                execute::execute_add(&open_app().await?, args, output_mode).await
            }
            Some(Commands::Remove(args)) => {
                execute::execute_remove(&open_app().await?, args, output_mode).await
            }
            Some(Commands::Deps(args)) => {
                execute::execute_deps(&open_app().await?, args, output_mode).await
            }
            Some(Commands::View(args)) => {
                execute::execute_view(&open_app().await?, args, output_mode).await
            }
            Some(Commands::Cycles(args)) => {
                execute::execute_cycles(&open_app().await?, args, output_mode).await
            }
            Some(Commands::Import(args)) => {
                execute::execute_import(&open_app().await?, args, output_mode).await
            }
            Some(Commands::Prune(args)) => {
                execute::execute_prune(&open_app().await?, args, output_mode).await
            }
            None => {
                println!("taskdeps task dependency graph engine");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

/// Open the workspace containing the current directory
async fn open_app() -> Result<crate::app::App> {
    Ok(crate::app::App::from_directory(&std::env::current_dir()?).await?)
}
