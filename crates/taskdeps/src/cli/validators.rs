//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::MAX_ID_LENGTH;
use crate::id_generation;

/// Shared rules for externally assigned identifiers.
///
/// Task and project IDs come from the surrounding system, so only the
/// characters that would break line-oriented output are rejected.
fn validate_external_id(s: &str, field_name: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err(format!("{field_name} cannot be empty"));
    }

    if s.len() > MAX_ID_LENGTH {
        return Err(format!(
            "{field_name} cannot exceed {MAX_ID_LENGTH} characters (got {})",
            s.len()
        ));
    }

    if let Some(c) = s.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!(
            "{field_name} cannot contain whitespace or control characters (found {c:?})"
        ));
    }

    Ok(s.to_string())
}

/// Validate a task ID.
pub fn validate_task_id(s: &str) -> Result<String, String> {
    validate_external_id(s, "Task ID")
}

/// Validate a project ID.
pub fn validate_project_id(s: &str) -> Result<String, String> {
    validate_external_id(s, "Project ID")
}

/// Validate a dependency edge ID.
///
/// Expected format: `dep-<hash>` with a 6-10 character lowercase base36 hash.
pub fn validate_edge_id(s: &str) -> Result<String, String> {
    let s = s.trim();
    if id_generation::validate_edge_id(s) {
        Ok(s.to_string())
    } else {
        Err(format!(
            "Invalid dependency ID: '{s}'. Expected format: dep-<hash> (e.g., dep-a1b2c3)"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::simple("t1")]
    #[case::uuid_like("6f1c2d9e-8b7a-4c3d-9e2f-1a2b3c4d5e6f")]
    #[case::dotted("backend.auth.login")]
    fn test_validate_task_id_valid(#[case] input: &str) {
        assert_eq!(validate_task_id(input).unwrap(), input);
    }

    #[test]
    fn test_validate_task_id_trims_whitespace() {
        assert_eq!(validate_task_id("  t1  ").unwrap(), "t1");
    }

    #[rstest]
    #[case::empty("", "cannot be empty")]
    #[case::whitespace_only("   ", "cannot be empty")]
    #[case::inner_space("task one", "whitespace")]
    #[case::control("t\u{7}1", "control")]
    fn test_validate_task_id_invalid(#[case] input: &str, #[case] expected: &str) {
        let err = validate_task_id(input).unwrap_err();
        assert!(err.contains(expected), "unexpected error: {err}");
    }

    #[test]
    fn test_validate_task_id_length_limit() {
        let at_limit = "a".repeat(MAX_ID_LENGTH);
        assert!(validate_task_id(&at_limit).is_ok());

        let over_limit = "a".repeat(MAX_ID_LENGTH + 1);
        let err = validate_task_id(&over_limit).unwrap_err();
        assert!(err.contains("cannot exceed"));
    }

    #[test]
    fn test_validate_project_id_names_field() {
        let err = validate_project_id("").unwrap_err();
        assert!(err.starts_with("Project ID"));
    }

    #[rstest]
    #[case::six_chars("dep-a1b2c3", true)]
    #[case::ten_chars("dep-a1b2c3d4e5", true)]
    #[case::too_short("dep-a1b2", false)]
    #[case::too_long("dep-a1b2c3d4e5f", false)]
    #[case::uppercase("dep-A1B2C3", false)]
    #[case::wrong_prefix("edge-a1b2c3", false)]
    #[case::no_prefix("a1b2c3", false)]
    fn test_validate_edge_id(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(validate_edge_id(input).is_ok(), valid, "input: {input}");
    }
}
