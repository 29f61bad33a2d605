//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Mutating
//! commands persist the edge set before reporting success.

use anyhow::{bail, Result};

use super::args::{
    AddArgs, CyclesArgs, DepsArgs, ImportArgs, InitArgs, PruneArgs, RemoveArgs, ViewArgs,
};
use crate::app::App;
use crate::domain::{EdgeId, ProjectId, TaskId};
use crate::output::{self, OutputMode, TaskNeighbors};
use crate::storage::jsonl;

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!("Initializing taskdeps workspace...");
    }

    let result = init::init(&current_dir, args.critical_threshold).await?;

    if !args.quiet {
        println!("Initialized taskdeps in {}", result.taskdeps_dir.display());
        println!("  Config:       {}", result.config_file.display());
        println!("  Tasks:        {}", result.tasks_file.display());
        println!("  Dependencies: {}", result.dependencies_file.display());
        println!("  Critical threshold: {}", result.critical_threshold);
    }

    Ok(())
}

/// Execute the add command
pub async fn execute_add(app: &App, args: &AddArgs, output_mode: OutputMode) -> Result<()> {
    let task_id = TaskId::new(args.task.as_str());
    let depends_on = TaskId::new(args.depends_on.as_str());

    let edge = app.service().add_dependency(&task_id, &depends_on).await?;
    app.save().await?;

    if output_mode == OutputMode::Text {
        print!("Added dependency ");
    }
    output::print_edge(&edge, output_mode)?;
    Ok(())
}

/// Execute the remove command
pub async fn execute_remove(app: &App, args: &RemoveArgs, output_mode: OutputMode) -> Result<()> {
    let edge_id = EdgeId::new(args.edge_id.as_str());

    let edge = app.service().remove_dependency(&edge_id).await?;
    app.save().await?;

    if output_mode == OutputMode::Text {
        print!("Removed dependency ");
    }
    output::print_edge(&edge, output_mode)?;
    Ok(())
}

/// Execute the deps command
pub async fn execute_deps(app: &App, args: &DepsArgs, output_mode: OutputMode) -> Result<()> {
    let task_id = TaskId::new(args.task.as_str());
    let service = app.service();

    let level = service.level_of(&task_id).await?;
    let neighbors = TaskNeighbors {
        dependencies: service.dependencies_of(&task_id).await.into_iter().collect(),
        dependents: service.dependents_of(&task_id).await.into_iter().collect(),
        task_id,
        level,
    };

    output::print_neighbors(&neighbors, output_mode)?;
    Ok(())
}

/// Execute the view command
pub async fn execute_view(app: &App, args: &ViewArgs, output_mode: OutputMode) -> Result<()> {
    let project_id = ProjectId::new(args.project.as_str());
    let view = app.service().project_dependency_view(&project_id).await?;
    output::print_view(&view, output_mode)?;
    Ok(())
}

/// Execute the cycles command
pub async fn execute_cycles(app: &App, args: &CyclesArgs, output_mode: OutputMode) -> Result<()> {
    let report = match &args.project {
        Some(project) => {
            app.service()
                .project_cycles(&ProjectId::new(project.as_str()))
                .await?
        }
        None => app.service().cycle_report().await?,
    };
    output::print_cycles(&report, output_mode)?;
    Ok(())
}

/// Execute the import command
///
/// Imported edges skip the cycle check; self-dependencies and duplicates are
/// skipped and reported.
pub async fn execute_import(app: &App, args: &ImportArgs, output_mode: OutputMode) -> Result<()> {
    if !tokio::fs::try_exists(&args.file).await? {
        bail!("Import file not found: {}", args.file.display());
    }

    let (edges, mut warnings) = jsonl::read_edges(&args.file).await?;
    let parsed = edges.len();
    let before = app.service().edge_count().await;

    warnings.extend(app.service().import(edges).await);
    app.save().await?;

    let imported = app.service().edge_count().await.saturating_sub(before);
    let cycles = app.service().cycle_report().await?;

    match output_mode {
        OutputMode::Json => {
            let warnings: Vec<String> = warnings.iter().map(ToString::to_string).collect();
            output::print_json(&serde_json::json!({
                "parsed": parsed,
                "imported": imported,
                "warnings": warnings,
                "cycles": cycles,
            }))?;
        }
        OutputMode::Text => {
            output::print_load_warnings(&warnings)?;
            println!(
                "Imported {imported} of {parsed} dependencies from {}",
                args.file.display()
            );
            if !cycles.is_empty() {
                output::print_cycles(&cycles, OutputMode::Text)?;
            }
        }
    }

    Ok(())
}

/// Execute the prune command
pub async fn execute_prune(app: &App, args: &PruneArgs, output_mode: OutputMode) -> Result<()> {
    let edges = if args.dry_run {
        app.service().orphaned_edges().await?
    } else {
        let removed = app.service().prune_orphaned_edges().await?;
        if !removed.is_empty() {
            app.save().await?;
        }
        removed
    };

    if output_mode == OutputMode::Text {
        let verb = if args.dry_run { "Would remove" } else { "Removed" };
        println!("{verb} {} orphaned dependencies", edges.len());
        if edges.is_empty() {
            return Ok(());
        }
    }
    output::print_edges(&edges, output_mode)?;
    Ok(())
}
