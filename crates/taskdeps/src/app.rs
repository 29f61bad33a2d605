//! Application context shared by the CLI and the MCP server.
//!
//! [`App`] locates the workspace, loads its configuration and data files, and
//! wires a [`DependencyService`] with persistence enabled.
//!
//! # Example
//!
//! ```no_run
//! use taskdeps::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let view = app.service().project_dependency_view(&"p1".into()).await?;
//!     println!("{} tasks", view.tasks.len());
//!     Ok(())
//! }
//! ```

use crate::config::{config_path, find_workspace_root, TaskdepsConfig};
use crate::error::{ConfigError, Result};
use crate::service::DependencyService;
use crate::storage::{jsonl, InMemoryTaskStore, LoadWarning};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// A loaded workspace.
#[derive(Debug)]
pub struct App {
    root_dir: PathBuf,
    config: TaskdepsConfig,
    tasks: InMemoryTaskStore,
    service: DependencyService,
    load_warnings: Vec<LoadWarning>,
}

impl App {
    /// Open the workspace containing `working_dir`.
    ///
    /// Searches up the directory tree for `.taskdeps/`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotInitialized` if no workspace is found
    /// - Configuration or I/O errors while loading
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_workspace_root(working_dir).ok_or(ConfigError::NotInitialized)?;
        Self::open(root_dir).await
    }

    /// Open the workspace rooted at `root_dir`.
    ///
    /// Malformed or invalid records in the data files are skipped and logged;
    /// they are also available through [`load_warnings`](Self::load_warnings).
    pub async fn open(root_dir: PathBuf) -> Result<Self> {
        let config = TaskdepsConfig::load(&config_path(&root_dir)).await?;

        let tasks_path = config.tasks_path(&root_dir);
        let dependencies_path = config.dependencies_path(&root_dir);

        let (tasks, mut load_warnings) = jsonl::load_tasks(&tasks_path).await?;
        let (graph, edge_warnings) = jsonl::load_edges(&dependencies_path).await?;
        load_warnings.extend(edge_warnings);

        for warning in &load_warnings {
            warn!("{warning}");
        }

        let task_count = tasks.len().await;
        debug!(
            root = %root_dir.display(),
            tasks = task_count,
            edges = graph.len(),
            "Opened workspace"
        );

        let service = DependencyService::new(
            graph,
            Arc::new(tasks.clone()),
            Arc::new(tasks.clone()),
        )
        .with_policy(config.classification)
        .with_persistence(dependencies_path);

        Ok(Self {
            root_dir,
            config,
            tasks,
            service,
            load_warnings,
        })
    }

    /// The dependency service
    pub fn service(&self) -> &DependencyService {
        &self.service
    }

    /// The loaded task store
    pub fn tasks(&self) -> &InMemoryTaskStore {
        &self.tasks
    }

    /// Workspace root directory
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Loaded configuration
    pub fn config(&self) -> &TaskdepsConfig {
        &self.config
    }

    /// Problems found while loading data files
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }

    /// Persist the edge set.
    ///
    /// This should be called after any mutating operation.
    pub async fn save(&self) -> Result<()> {
        self.service.save().await
    }
}
