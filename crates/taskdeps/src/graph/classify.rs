//! Blocking and critical flags.
//!
//! Both flags depend only on the number of live dependents and the task's
//! status:
//!
//! - **blocking**: at least one dependent, and not yet resolved
//! - **critical**: more dependents than the threshold regardless of status,
//!   or at least one dependent while the task has not been started

use crate::domain::TaskStatus;
use serde::{Deserialize, Serialize};

/// Dependent count above which a task is critical regardless of status.
pub const DEFAULT_CRITICAL_DEPENDENT_THRESHOLD: usize = 2;

/// Thresholds and statuses that drive classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClassificationPolicy {
    /// A task with more dependents than this is always critical
    pub critical_dependent_threshold: usize,

    /// Status at which a task stops blocking its dependents
    pub resolved_status: TaskStatus,

    /// Status that makes any dependent-bearing task critical
    pub not_started_status: TaskStatus,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            critical_dependent_threshold: DEFAULT_CRITICAL_DEPENDENT_THRESHOLD,
            resolved_status: TaskStatus::Completed,
            not_started_status: TaskStatus::Todo,
        }
    }
}

/// Flags derived for a single task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    /// Has dependents and is not resolved
    pub is_blocking: bool,

    /// Threatens several dependents, or an immediately-next one
    pub is_critical: bool,
}

impl ClassificationPolicy {
    /// Whether a task with this status and dependent count blocks others
    pub fn is_blocking(&self, status: TaskStatus, dependent_count: usize) -> bool {
        dependent_count > 0 && status != self.resolved_status
    }

    /// Whether a task with this status and dependent count is critical
    pub fn is_critical(&self, status: TaskStatus, dependent_count: usize) -> bool {
        dependent_count > self.critical_dependent_threshold
            || (dependent_count > 0 && status == self.not_started_status)
    }

    /// Both flags at once
    pub fn classify(&self, status: TaskStatus, dependent_count: usize) -> Classification {
        Classification {
            is_blocking: self.is_blocking(status, dependent_count),
            is_critical: self.is_critical(status, dependent_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_dependents_todo(TaskStatus::Todo, 0, false)]
    #[case::no_dependents_in_progress(TaskStatus::InProgress, 0, false)]
    #[case::one_dependent_todo(TaskStatus::Todo, 1, true)]
    #[case::one_dependent_review(TaskStatus::Review, 1, true)]
    #[case::one_dependent_blocked(TaskStatus::Blocked, 1, true)]
    #[case::completed_with_dependents(TaskStatus::Completed, 5, false)]
    fn test_is_blocking(#[case] status: TaskStatus, #[case] dependents: usize, #[case] expected: bool) {
        let policy = ClassificationPolicy::default();
        assert_eq!(policy.is_blocking(status, dependents), expected);
    }

    #[rstest]
    #[case::none(TaskStatus::Todo, 0, false)]
    #[case::todo_one(TaskStatus::Todo, 1, true)]
    #[case::in_progress_one(TaskStatus::InProgress, 1, false)]
    #[case::in_progress_two(TaskStatus::InProgress, 2, false)]
    #[case::in_progress_three(TaskStatus::InProgress, 3, true)]
    #[case::completed_three(TaskStatus::Completed, 3, true)]
    #[case::completed_one(TaskStatus::Completed, 1, false)]
    fn test_is_critical(#[case] status: TaskStatus, #[case] dependents: usize, #[case] expected: bool) {
        let policy = ClassificationPolicy::default();
        assert_eq!(policy.is_critical(status, dependents), expected);
    }

    #[test]
    fn test_completion_clears_blocking_but_not_critical() {
        let policy = ClassificationPolicy::default();

        let before = policy.classify(TaskStatus::InProgress, 4);
        let after = policy.classify(TaskStatus::Completed, 4);

        assert!(before.is_blocking && before.is_critical);
        assert!(!after.is_blocking);
        assert!(after.is_critical);
    }

    #[test]
    fn test_custom_threshold() {
        let policy = ClassificationPolicy {
            critical_dependent_threshold: 5,
            ..Default::default()
        };
        assert!(!policy.is_critical(TaskStatus::InProgress, 5));
        assert!(policy.is_critical(TaskStatus::InProgress, 6));
    }

    #[test]
    fn test_policy_yaml_uses_kebab_case_and_defaults() {
        let policy: ClassificationPolicy =
            serde_yaml::from_str("critical-dependent-threshold: 4\n").unwrap();
        assert_eq!(policy.critical_dependent_threshold, 4);
        assert_eq!(policy.resolved_status, TaskStatus::Completed);
        assert_eq!(policy.not_started_status, TaskStatus::Todo);
    }
}
