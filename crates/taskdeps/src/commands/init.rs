//! Implementation of the `init` command.
//!
//! Creates the `.taskdeps/` directory with a default configuration, an empty
//! tasks export and an empty dependency file.

use crate::config::{
    TaskdepsConfig, CONFIG_FILE_NAME, DEPENDENCIES_FILE_NAME, TASKDEPS_DIR_NAME, TASKS_FILE_NAME,
};
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the gitignore file within `.taskdeps`
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created `.taskdeps` directory
    pub taskdeps_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created tasks file
    pub tasks_file: PathBuf,
    /// Path to the created dependency file
    pub dependencies_file: PathBuf,
    /// The critical-dependent threshold written to the config
    pub critical_threshold: usize,
}

/// Initialize a new workspace in `base_dir`.
///
/// # Arguments
///
/// * `base_dir` - Directory where `.taskdeps/` will be created
/// * `critical_threshold` - Optional override for the critical-dependent threshold
///
/// # Errors
///
/// - `ConfigError::AlreadyInitialized` if `.taskdeps/` already exists
/// - `Error::Io` if file system operations fail
pub async fn init(base_dir: &Path, critical_threshold: Option<usize>) -> Result<InitResult> {
    let taskdeps_dir = base_dir.join(TASKDEPS_DIR_NAME);

    if taskdeps_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(taskdeps_dir).into());
    }

    fs::create_dir_all(&taskdeps_dir).await?;

    let mut config = TaskdepsConfig::default();
    if let Some(threshold) = critical_threshold {
        config.classification.critical_dependent_threshold = threshold;
    }

    let config_file = taskdeps_dir.join(CONFIG_FILE_NAME);
    config.save(&config_file).await?;

    let tasks_file = taskdeps_dir.join(TASKS_FILE_NAME);
    fs::write(&tasks_file, "").await?;

    let dependencies_file = taskdeps_dir.join(DEPENDENCIES_FILE_NAME);
    fs::write(&dependencies_file, "").await?;

    let gitignore_file = taskdeps_dir.join(GITIGNORE_FILE_NAME);
    fs::write(
        &gitignore_file,
        "\
# Leftovers from interrupted saves
*.tmp
",
    )
    .await?;

    debug!(path = %taskdeps_dir.display(), "Initialized workspace");

    Ok(InitResult {
        taskdeps_dir,
        config_file,
        tasks_file,
        dependencies_file,
        critical_threshold: config.classification.critical_dependent_threshold,
    })
}

/// Whether `base_dir` contains a `.taskdeps/` directory
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TASKDEPS_DIR_NAME).is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::graph::classify::DEFAULT_CRITICAL_DEPENDENT_THRESHOLD;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_directory_structure() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None).await.unwrap();

        assert!(result.taskdeps_dir.is_dir());
        assert!(result.config_file.exists());
        assert!(result.tasks_file.exists());
        assert!(result.dependencies_file.exists());
        assert!(is_initialized(temp_dir.path()));
        assert_eq!(
            result.critical_threshold,
            DEFAULT_CRITICAL_DEPENDENT_THRESHOLD
        );
    }

    #[tokio::test]
    async fn test_init_writes_custom_threshold() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), Some(4)).await.unwrap();

        let config = TaskdepsConfig::load(&result.config_file).await.unwrap();
        assert_eq!(config.classification.critical_dependent_threshold, 4);
    }

    #[tokio::test]
    async fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), None).await.unwrap();

        let result = init(temp_dir.path(), None).await;
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::AlreadyInitialized(_)))
        ));
    }

    #[tokio::test]
    async fn test_init_creates_empty_data_files() {
        let temp_dir = TempDir::new().unwrap();
        let result = init(temp_dir.path(), None).await.unwrap();

        let tasks = fs::read_to_string(&result.tasks_file).await.unwrap();
        let deps = fs::read_to_string(&result.dependencies_file).await.unwrap();
        assert!(tasks.is_empty());
        assert!(deps.is_empty());
    }

    #[test]
    fn test_is_initialized_false() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!is_initialized(temp_dir.path()));
    }
}
