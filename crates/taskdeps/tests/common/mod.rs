//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the compiled `taskdeps` binary
pub fn taskdeps_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_taskdeps"))
}

/// Run the taskdeps binary in the specified directory
pub fn run_taskdeps_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(taskdeps_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("TASKDEPS_ASCII", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute taskdeps binary")
}

/// One line of a `tasks.jsonl` export
pub fn task_line(id: &str, project: &str, status: &str, title: &str) -> String {
    serde_json::json!({
        "id": id,
        "projectId": project,
        "status": status,
        "title": title,
    })
    .to_string()
}

/// Overwrite the workspace's task export
pub fn write_tasks(root: &Path, tasks: &[(&str, &str, &str)]) {
    let lines: Vec<String> = tasks
        .iter()
        .map(|(id, project, status)| task_line(id, project, status, &format!("Task {id}")))
        .collect();
    std::fs::write(root.join(".taskdeps/tasks.jsonl"), lines.join("\n") + "\n")
        .expect("Failed to write tasks.jsonl");
}

/// Stdout of a successful run, panicking with stderr otherwise
pub fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a failed run, panicking otherwise
pub fn stderr_of_failure(output: &Output) -> String {
    assert!(
        !output.status.success(),
        "command unexpectedly succeeded: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    String::from_utf8_lossy(&output.stderr).into_owned()
}
