//! Workspace configuration.
//!
//! A workspace is a directory containing `.taskdeps/config.yaml`:
//!
//! ```yaml
//! storage:
//!   tasks-file: .taskdeps/tasks.jsonl
//!   dependencies-file: .taskdeps/dependencies.jsonl
//! classification:
//!   critical-dependent-threshold: 2
//! ```
//!
//! File paths are relative to the workspace root.

use crate::error::{ConfigError, Result};
use crate::graph::ClassificationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the workspace metadata directory
pub const TASKDEPS_DIR_NAME: &str = ".taskdeps";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the tasks export file
pub const TASKS_FILE_NAME: &str = "tasks.jsonl";

/// Name of the dependency edge file
pub const DEPENDENCIES_FILE_NAME: &str = "dependencies.jsonl";

/// Maximum directory depth to traverse when searching for the workspace root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Contents of `config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TaskdepsConfig {
    /// Where data files live
    pub storage: StorageConfig,

    /// Blocking/critical thresholds
    #[serde(default)]
    pub classification: ClassificationPolicy,
}

/// Storage configuration section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Path of the tasks export, relative to the workspace root
    pub tasks_file: String,

    /// Path of the dependency edge file, relative to the workspace root
    pub dependencies_file: String,
}

impl Default for TaskdepsConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                tasks_file: format!("{TASKDEPS_DIR_NAME}/{TASKS_FILE_NAME}"),
                dependencies_file: format!("{TASKDEPS_DIR_NAME}/{DEPENDENCIES_FILE_NAME}"),
            },
            classification: ClassificationPolicy::default(),
        }
    }
}

impl TaskdepsConfig {
    /// Load and validate configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::from)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("storage.tasks-file", &self.storage.tasks_file),
            ("storage.dependencies-file", &self.storage.dependencies_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} cannot be empty")).into());
            }
            if Path::new(value).is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be relative to the workspace root, got '{value}'"
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Absolute path of the tasks export under `root`
    pub fn tasks_path(&self, root: &Path) -> PathBuf {
        root.join(&self.storage.tasks_file)
    }

    /// Absolute path of the dependency file under `root`
    pub fn dependencies_path(&self, root: &Path) -> PathBuf {
        root.join(&self.storage.dependencies_file)
    }
}

/// Path of `config.yaml` for the workspace rooted at `root`
pub fn config_path(root: &Path) -> PathBuf {
    root.join(TASKDEPS_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Find the workspace root by searching up the directory tree.
///
/// Returns the first directory (starting at `start_dir`) that contains a
/// `.taskdeps/` directory, or `None` if the filesystem root or the depth limit
/// is reached first.
pub fn find_workspace_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TASKDEPS_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths_live_under_workspace_dir() {
        let config = TaskdepsConfig::default();
        let root = Path::new("/work");

        assert_eq!(
            config.dependencies_path(root),
            PathBuf::from("/work/.taskdeps/dependencies.jsonl")
        );
        assert_eq!(
            config.tasks_path(root),
            PathBuf::from("/work/.taskdeps/tasks.jsonl")
        );
    }

    #[test]
    fn test_yaml_layout() {
        let yaml = serde_yaml::to_string(&TaskdepsConfig::default()).unwrap();
        assert!(yaml.contains("tasks-file: .taskdeps/tasks.jsonl"));
        assert!(yaml.contains("critical-dependent-threshold: 2"));
    }

    #[test]
    fn test_classification_section_is_optional() {
        let yaml = "storage:\n  tasks-file: t.jsonl\n  dependencies-file: d.jsonl\n";
        let config: TaskdepsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.classification, ClassificationPolicy::default());
    }

    #[rstest]
    #[case::empty_tasks("", "d.jsonl")]
    #[case::blank_dependencies("t.jsonl", "   ")]
    #[case::absolute("/etc/tasks.jsonl", "d.jsonl")]
    fn test_validate_rejects_bad_paths(#[case] tasks: &str, #[case] dependencies: &str) {
        let config = TaskdepsConfig {
            storage: StorageConfig {
                tasks_file: tasks.to_string(),
                dependencies_file: dependencies.to_string(),
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::Invalid(_)))
        ));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);

        let mut config = TaskdepsConfig::default();
        config.classification.critical_dependent_threshold = 5;
        config.save(&path).await.unwrap();

        let loaded = TaskdepsConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_reports_yaml_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "storage: [unclosed").unwrap();

        let result = TaskdepsConfig::load(&path).await;
        assert!(matches!(result, Err(Error::Config(ConfigError::Yaml(_)))));
    }

    #[test]
    fn test_find_workspace_root_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(TASKDEPS_DIR_NAME)).unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_workspace_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_find_workspace_root_ignores_plain_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(TASKDEPS_DIR_NAME), "").unwrap();

        // A temp dir's ancestors could in principle hold a workspace, so only
        // check that the file itself was not accepted.
        assert_ne!(
            find_workspace_root(temp.path()),
            Some(temp.path().to_path_buf())
        );
    }
}
