//! Workspace context management for the MCP server.
//!
//! This module handles:
//! - Workspace detection (walking up to find `.taskdeps/`)
//! - Path canonicalization
//! - Per-workspace [`App`] instance management
//!
//! # Lock Ordering
//!
//! `Tools` takes the `Context` lock only long enough to clone an
//! `Arc<App>` out of the cache. Engine calls run after the context lock is
//! released, so the engine's graph lock is never held together with it.

use crate::error::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskdeps::app::App;
use taskdeps::config::TASKDEPS_DIR_NAME;
use tracing::debug;

/// Maximum number of cached workspaces to prevent resource exhaustion.
///
/// When this limit is reached, the oldest workspace is evicted from cache.
const MAX_CACHED_WORKSPACES: usize = 32;

/// Global context state for the MCP server.
///
/// Manages workspace contexts and loaded engines for multi-workspace support.
#[derive(Default)]
pub struct Context {
    /// The current active workspace root.
    current_workspace: Option<PathBuf>,

    /// Per-workspace engines (limited to [`MAX_CACHED_WORKSPACES`]).
    app_cache: HashMap<PathBuf, Arc<App>>,

    /// Insertion order for FIFO cache eviction.
    cache_order: VecDeque<PathBuf>,
}

impl Context {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current workspace root.
    ///
    /// This will:
    /// 1. Canonicalize the path (resolves `..`, symlinks, validates existence)
    /// 2. Validate the path is safe (no null bytes, is absolute)
    /// 3. Verify a `.taskdeps/` directory exists
    /// 4. Load the workspace, or reuse the cached engine
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace path doesn't exist, has no
    /// `.taskdeps/` directory, or its configuration or data can't be loaded.
    pub async fn set_workspace(&mut self, workspace_root: &Path) -> Result<WorkspaceInfo> {
        debug!(path = %workspace_root.display(), "Setting workspace");

        let canonical = workspace_root
            .canonicalize()
            .map_err(|e| Error::WorkspaceNotFound {
                path: workspace_root.display().to_string(),
                source: Some(e),
            })?;

        validate_path(&canonical)?;

        let taskdeps_dir = canonical.join(TASKDEPS_DIR_NAME);
        if !taskdeps_dir.is_dir() {
            debug!(path = %taskdeps_dir.display(), "No .taskdeps directory found");
            return Err(Error::NoTaskdepsDirectory(canonical.display().to_string()));
        }

        let app = match self.app_cache.get(&canonical) {
            Some(app) => {
                debug!("Using cached workspace");
                Arc::clone(app)
            }
            None => {
                debug!("Loading workspace");
                while self.app_cache.len() >= MAX_CACHED_WORKSPACES {
                    self.evict_oldest();
                }

                let app = Arc::new(App::open(canonical.clone()).await?);
                self.app_cache.insert(canonical.clone(), Arc::clone(&app));
                self.cache_order.push_back(canonical.clone());
                app
            }
        };

        self.current_workspace = Some(canonical.clone());

        Ok(WorkspaceInfo {
            workspace_root: canonical,
            dependencies_path: dependencies_path(&app),
            load_warnings: app.load_warnings().iter().map(ToString::to_string).collect(),
        })
    }

    /// Evict the oldest cached workspace to make room for new entries.
    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.cache_order.pop_front() {
            self.app_cache.remove(&oldest);
            if self.current_workspace.as_ref() == Some(&oldest) {
                self.current_workspace = None;
            }
            debug!(workspace = %oldest.display(), "Evicted workspace from cache");
        }
    }

    /// Get the current workspace root.
    #[must_use]
    pub fn current_workspace(&self) -> Option<&PathBuf> {
        self.current_workspace.as_ref()
    }

    /// Get the dependency file path for the current workspace.
    #[must_use]
    pub fn current_dependencies_path(&self) -> Option<PathBuf> {
        self.current_workspace
            .as_ref()
            .and_then(|ws| self.app_cache.get(ws))
            .map(|app| dependencies_path(app))
    }

    /// Get the engine for a specific workspace, or the current one if not specified.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No context is set and no workspace path is provided
    /// - The workspace path doesn't exist (with IO error context)
    /// - The workspace exists but wasn't initialized via `set_workspace()`
    pub fn app_for(&self, workspace_root: Option<&Path>) -> Result<Arc<App>> {
        let workspace = match workspace_root {
            Some(path) => path.canonicalize().map_err(|e| Error::WorkspaceNotFound {
                path: path.display().to_string(),
                source: Some(e),
            })?,
            None => self.current_workspace.clone().ok_or(Error::NoContext)?,
        };

        self.app_cache
            .get(&workspace)
            .cloned()
            .ok_or_else(|| Error::WorkspaceNotInitialized(workspace.display().to_string()))
    }

    /// Discover and set the workspace by walking up from the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no `.taskdeps/` directory is found in the path
    /// hierarchy, or if loading the workspace fails.
    pub async fn discover_and_set_workspace(&mut self, start: &Path) -> Result<WorkspaceInfo> {
        let workspace_root = discover_workspace(start)?;
        self.set_workspace(&workspace_root).await
    }

    /// Get the number of cached workspaces (for testing).
    #[cfg(test)]
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.app_cache.len()
    }
}

/// Information about a workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceInfo {
    /// The canonical path to the workspace root.
    pub workspace_root: PathBuf,

    /// The path to the dependency file.
    pub dependencies_path: PathBuf,

    /// Problems found while loading the workspace's data files.
    pub load_warnings: Vec<String>,
}

fn dependencies_path(app: &App) -> PathBuf {
    app.config().dependencies_path(app.root_dir())
}

/// Validate that a path is safe to use as a workspace.
///
/// - Path must be absolute (canonicalization ensures this)
/// - Path must not contain null bytes
/// - Path must not contain `..` components after canonicalization
fn validate_path(path: &Path) -> Result<()> {
    if !path.is_absolute() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Workspace path must be absolute",
        )));
    }

    if path.to_string_lossy().contains('\0') {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Workspace path contains invalid characters",
        )));
    }

    if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Workspace path contains parent directory references",
        )));
    }

    Ok(())
}

/// Discover a taskdeps workspace by walking up from the given directory.
///
/// Returns the canonicalized workspace root (directory containing `.taskdeps/`).
///
/// # Errors
///
/// Returns `Error::NoTaskdepsDirectory` if no `.taskdeps/` directory is found,
/// or `Error::WorkspaceNotFound` if the path cannot be canonicalized.
pub fn discover_workspace(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(TASKDEPS_DIR_NAME).is_dir() {
            // Canonicalize to resolve symlinks (e.g., /var -> /private/var on macOS)
            return current
                .canonicalize()
                .map_err(|e| Error::WorkspaceNotFound {
                    path: current.display().to_string(),
                    source: Some(e),
                });
        }

        if !current.pop() {
            break;
        }
    }

    Err(Error::NoTaskdepsDirectory(start.display().to_string()))
}
