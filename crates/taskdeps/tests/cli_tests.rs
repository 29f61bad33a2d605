//! Integration tests for the taskdeps CLI.
//!
//! These tests verify the end-to-end behavior of all CLI commands.

use rstest::{fixture, rstest};
use serde_json::Value;
use tempfile::TempDir;

mod common;
use common::{run_taskdeps_in_dir, stderr_of_failure, stdout_of, write_tasks};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a workspace with three todo tasks in project p1 and one in p2
#[fixture]
fn workspace() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let output = run_taskdeps_in_dir(temp.path(), &["init", "--quiet"]);
    assert!(
        output.status.success(),
        "Failed to initialize taskdeps: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    write_tasks(
        temp.path(),
        &[
            ("t1", "p1", "todo"),
            ("t2", "p1", "todo"),
            ("t3", "p1", "todo"),
            ("x1", "p2", "in_progress"),
        ],
    );
    temp
}

fn json(dir: &TempDir, args: &[&str]) -> Value {
    let mut argv = vec!["--json"];
    argv.extend_from_slice(args);
    let stdout = stdout_of(&run_taskdeps_in_dir(dir.path(), &argv));
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

fn add(dir: &TempDir, task: &str, depends_on: &str) -> String {
    let edge = json(dir, &["add", task, depends_on]);
    edge["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let temp = TempDir::new().unwrap();
    let stdout = stdout_of(&run_taskdeps_in_dir(temp.path(), &["--help"]));
    assert!(stdout.contains("taskdeps"));
    assert!(stdout.contains("Usage:"));
}

#[test]
fn test_command_outside_workspace_fails() {
    let temp = TempDir::new().unwrap();
    let stderr = stderr_of_failure(&run_taskdeps_in_dir(temp.path(), &["view", "p1"]));
    assert!(stderr.contains("taskdeps init"), "stderr: {stderr}");
}

// ============================================================================
// Mutation Tests
// ============================================================================

#[rstest]
fn test_add_and_view_levels(workspace: TempDir) {
    add(&workspace, "t2", "t1");
    add(&workspace, "t3", "t2");

    let view = json(&workspace, &["view", "p1"]);
    let tasks = view["tasks"].as_array().unwrap();
    let order: Vec<(&str, u64)> = tasks
        .iter()
        .map(|t| (t["id"].as_str().unwrap(), t["level"].as_u64().unwrap()))
        .collect();
    assert_eq!(order, vec![("t3", 2), ("t2", 1), ("t1", 0)]);

    assert_eq!(tasks[2]["isBlocking"], true);
    assert_eq!(tasks[2]["isCritical"], true);
    assert_eq!(tasks[0]["isBlocking"], false);
    assert_eq!(view["cycles"], serde_json::json!([]));
}

#[rstest]
fn test_add_closing_cycle_is_rejected(workspace: TempDir) {
    add(&workspace, "t2", "t1");
    add(&workspace, "t3", "t2");

    let stderr = stderr_of_failure(&run_taskdeps_in_dir(
        workspace.path(),
        &["add", "t1", "t3"],
    ));
    assert!(stderr.contains("CYCLE_DETECTED"), "stderr: {stderr}");

    let deps = json(&workspace, &["deps", "t1"]);
    assert_eq!(deps["dependencies"], serde_json::json!([]));
}

#[rstest]
#[case::self_dependency(&["add", "t1", "t1"], "SELF_DEPENDENCY")]
#[case::unknown_task(&["add", "t1", "nope"], "TASK_NOT_FOUND")]
#[case::unknown_edge(&["remove", "dep-zzzzzz"], "NOT_FOUND")]
#[case::unknown_project(&["view", "p9"], "PROJECT_NOT_FOUND")]
fn test_error_codes(workspace: TempDir, #[case] args: &[&str], #[case] code: &str) {
    let stderr = stderr_of_failure(&run_taskdeps_in_dir(workspace.path(), args));
    assert!(stderr.contains(&format!("[{code}]")), "stderr: {stderr}");
}

#[rstest]
fn test_duplicate_add_is_rejected(workspace: TempDir) {
    add(&workspace, "t2", "t1");
    let stderr = stderr_of_failure(&run_taskdeps_in_dir(workspace.path(), &["add", "t2", "t1"]));
    assert!(stderr.contains("DUPLICATE_EDGE"));
}

#[rstest]
fn test_remove_is_persisted(workspace: TempDir) {
    let id = add(&workspace, "t2", "t1");

    let removed = json(&workspace, &["remove", &id]);
    assert_eq!(removed["id"], id.as_str());

    let deps = json(&workspace, &["deps", "t1"]);
    assert_eq!(deps["dependents"], serde_json::json!([]));

    let content =
        std::fs::read_to_string(workspace.path().join(".taskdeps/dependencies.jsonl")).unwrap();
    assert!(!content.contains(&id));
}

#[rstest]
fn test_text_output_for_add(workspace: TempDir) {
    let stdout = stdout_of(&run_taskdeps_in_dir(workspace.path(), &["add", "t2", "t1"]));
    assert!(stdout.starts_with("Added dependency dep-"));
    assert!(stdout.contains("t2 -> t1"));
}

// ============================================================================
// Import, Cycles and Prune
// ============================================================================

#[rstest]
fn test_import_reports_cycles(workspace: TempDir) {
    let file = workspace.path().join("edges.jsonl");
    std::fs::write(
        &file,
        concat!(
            r#"{"id":"dep-aaaaa1","taskId":"t1","dependsOnTaskId":"t2"}"#, "\n",
            r#"{"id":"dep-aaaaa2","taskId":"t2","dependsOnTaskId":"t3"}"#, "\n",
            r#"{"id":"dep-aaaaa3","taskId":"t3","dependsOnTaskId":"t1"}"#, "\n",
            r#"{"id":"dep-aaaaa4","taskId":"t1","dependsOnTaskId":"t1"}"#, "\n",
        ),
    )
    .unwrap();

    let summary = json(&workspace, &["import", file.to_str().unwrap()]);
    assert_eq!(summary["parsed"], 4);
    assert_eq!(summary["imported"], 3);
    assert_eq!(summary["warnings"].as_array().unwrap().len(), 1);

    let cycles = json(&workspace, &["cycles", "p1"]);
    assert_eq!(cycles, serde_json::json!([["t1", "t2", "t3"]]));

    // The view still answers, with finite levels
    let view = json(&workspace, &["view", "p1"]);
    assert_eq!(view["tasks"].as_array().unwrap().len(), 3);
    assert_eq!(view["cycles"].as_array().unwrap().len(), 1);
}

#[rstest]
fn test_import_missing_file_fails(workspace: TempDir) {
    let stderr = stderr_of_failure(&run_taskdeps_in_dir(
        workspace.path(),
        &["import", "does-not-exist.jsonl"],
    ));
    assert!(stderr.contains("not found"));
}

#[rstest]
fn test_cycles_on_dag_is_empty(workspace: TempDir) {
    add(&workspace, "t2", "t1");
    assert_eq!(json(&workspace, &["cycles"]), serde_json::json!([]));
}

#[rstest]
fn test_orphans_are_warned_then_pruned(workspace: TempDir) {
    add(&workspace, "t2", "t1");
    let orphan = add(&workspace, "t3", "t2");

    // t3 disappears from the export
    write_tasks(
        workspace.path(),
        &[("t1", "p1", "todo"), ("t2", "p1", "todo"), ("x1", "p2", "in_progress")],
    );

    let view = json(&workspace, &["view", "p1"]);
    let warnings = view["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["kind"], "orphaned_edge");
    assert_eq!(warnings[0]["edgeId"], orphan.as_str());

    let t2 = &view["tasks"][0];
    assert_eq!(t2["id"], "t2");
    assert_eq!(t2["isBlocking"], false);

    let dry_run = json(&workspace, &["prune", "--dry-run"]);
    assert_eq!(dry_run.as_array().unwrap().len(), 1);

    let pruned = json(&workspace, &["prune"]);
    assert_eq!(pruned[0]["id"], orphan.as_str());

    let view = json(&workspace, &["view", "p1"]);
    assert_eq!(view["warnings"], serde_json::json!([]));
}

#[rstest]
fn test_cross_project_edge_stays_out_of_views(workspace: TempDir) {
    add(&workspace, "x1", "t1");

    let view = json(&workspace, &["view", "p1"]);
    assert_eq!(view["tasks"][0]["dependents"], serde_json::json!([]));
    assert_eq!(view["warnings"], serde_json::json!([]));

    let deps = json(&workspace, &["deps", "t1"]);
    assert_eq!(deps["dependents"], serde_json::json!(["x1"]));
}
