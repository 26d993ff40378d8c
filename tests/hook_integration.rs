//! Integration tests for the phasegate CLI.
//!
//! Each test drives the compiled binary the way the hook host would: one
//! JSON payload on stdin, one JSON response on stdout, exit code 0.

use assert_cmd::cargo;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

/// Get a Command for the phasegate binary
fn phasegate() -> Command {
    Command::new(cargo::cargo_bin!("phasegate"))
}

/// Write a minimal workflow state document under `root`.
fn write_state(root: &std::path::Path, state: serde_json::Value) {
    let dir = root.join(".agents");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("workflow.json"),
        serde_json::to_string_pretty(&state).unwrap(),
    )
    .unwrap();
}

fn base_state() -> serde_json::Value {
    json!({
        "version": "2",
        "lastUpdated": "2024-01-01T00:00:00Z"
    })
}

#[test]
fn test_help() {
    phasegate()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hook"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_version_tracks_package_metadata() {
    phasegate()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_stop_keeps_blocking_while_queue_has_items() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join(".agents/work");
    std::fs::create_dir_all(&work_dir).unwrap();
    std::fs::write(work_dir.join("queued.md"), "- **first-item** -- do this\n").unwrap();

    for _ in 0..2 {
        phasegate()
            .args(["hook", "stop", "--project"])
            .arg(temp.path())
            .write_stdin("{}")
            .assert()
            .success()
            .stdout(predicate::str::contains("block"))
            .stdout(predicate::str::contains("first-item"));
    }
}

#[test]
fn test_session_start_returns_context() {
    phasegate()
        .args(["hook", "session-start"])
        .write_stdin("{}")
        .assert()
        .success()
        .stdout(predicate::str::contains("approve"))
        .stdout(predicate::str::contains("additionalContext"));
}

#[test]
fn test_user_prompt_submit_approves() {
    phasegate()
        .args(["hook", "user-prompt-submit"])
        .write_stdin(r#"{"prompt": "keep going"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("approve"));
}

#[test]
fn test_stop_permits_and_creates_state() {
    let temp = TempDir::new().unwrap();

    phasegate()
        .args(["hook", "stop", "--project"])
        .arg(temp.path())
        .write_stdin("{}")
        .assert()
        .success()
        .stdout(predicate::str::contains("{}"));

    assert!(temp.path().join(".agents/workflow.json").exists());
}

#[test]
fn test_stop_blocks_on_active_work_until_target() {
    let temp = TempDir::new().unwrap();
    let mut state = base_state();
    state["currentWorkItem"] = json!("add-login");
    state["workItemStartedAt"] = json!("2024-01-01T00:00:00Z");
    state["currentPhase"] = json!("green");
    state["workUntil"] = json!("add-login");
    write_state(temp.path(), state);

    phasegate()
        .args(["hook", "stop", "--project"])
        .arg(temp.path())
        .write_stdin("{}")
        .assert()
        .success()
        .stdout(predicate::str::contains("block"))
        .stdout(predicate::str::contains("add-login"));
}

#[test]
fn test_stop_permits_once_target_is_archived() {
    let temp = TempDir::new().unwrap();
    let mut state = base_state();
    state["workUntil"] = json!("add-login");
    write_state(temp.path(), state);

    let archive_dir = temp.path().join(".agents/archive");
    std::fs::create_dir_all(&archive_dir).unwrap();
    std::fs::write(archive_dir.join("done.md"), "### add-login\n").unwrap();

    phasegate()
        .args(["hook", "stop", "--project"])
        .arg(temp.path())
        .write_stdin("{}")
        .assert()
        .success()
        .stdout(predicate::str::contains("{}"));

    // The satisfied target cleared itself.
    let saved =
        std::fs::read_to_string(temp.path().join(".agents/workflow.json")).unwrap();
    assert!(!saved.contains("workUntil"));
}

#[test]
fn test_subagent_stop_sync_only_never_blocks() {
    let temp = TempDir::new().unwrap();
    let mut state = base_state();
    state["currentWorkItem"] = json!("add-login");
    state["workUntil"] = json!("add-login");
    write_state(temp.path(), state);

    phasegate()
        .args(["hook", "subagent-stop", "--sync-only", "--project"])
        .arg(temp.path())
        .write_stdin("{}")
        .assert()
        .success()
        .stdout(predicate::str::contains("{}"));
}

#[test]
fn test_pre_tool_use_blocks_impl_edit_in_red_phase() {
    let temp = TempDir::new().unwrap();
    let mut state = base_state();
    state["currentPhase"] = json!("red");
    write_state(temp.path(), state);

    let payload = json!({
        "tool_name": "Edit",
        "tool_input": {"file_path": "src/foo.ts"}
    });

    phasegate()
        .args(["hook", "pre-tool-use", "--project"])
        .arg(temp.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("block"))
        .stdout(predicate::str::contains("src/foo.ts"));
}

#[test]
fn test_pre_tool_use_permits_test_edit_in_red_phase() {
    let temp = TempDir::new().unwrap();
    let mut state = base_state();
    state["currentPhase"] = json!("red");
    write_state(temp.path(), state);

    let payload = json!({
        "tool_name": "Edit",
        "tool_input": {"file_path": "src/foo.test.ts"}
    });

    phasegate()
        .args(["hook", "pre-tool-use", "--project"])
        .arg(temp.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("{}"));
}

#[test]
fn test_post_tool_use_commit_moves_phase() {
    let temp = TempDir::new().unwrap();
    write_state(temp.path(), base_state());

    let payload = json!({
        "tool_name": "Bash",
        "tool_input": {"command": "git commit -m \"test(auth): add failing case\""}
    });

    phasegate()
        .args(["hook", "post-tool-use", "--project"])
        .arg(temp.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("{}"));

    let saved =
        std::fs::read_to_string(temp.path().join(".agents/workflow.json")).unwrap();
    assert!(saved.contains("\"red\""));
}

#[test]
fn test_malformed_payload_degrades_to_neutral_response() {
    let temp = TempDir::new().unwrap();

    phasegate()
        .args(["hook", "stop", "--project"])
        .arg(temp.path())
        .write_stdin("this is not json")
        .assert()
        .success()
        .stdout(predicate::str::contains("{}"));
}

#[test]
fn test_status_reports_phase_and_queue() {
    let temp = TempDir::new().unwrap();
    let mut state = base_state();
    state["currentPhase"] = json!("green");
    state["currentWorkItem"] = json!("add-login");
    write_state(temp.path(), state);

    let todos_dir = temp.path().join(".agents/todos");
    std::fs::create_dir_all(&todos_dir).unwrap();
    std::fs::write(
        todos_dir.join("todo.md"),
        "## In Progress\n- [ ] **add-login** -- wire it up\n",
    )
    .unwrap();

    phasegate()
        .args(["status", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("green"))
        .stdout(predicate::str::contains("add-login"));
}

#[test]
fn test_status_without_state() {
    let temp = TempDir::new().unwrap();

    phasegate()
        .args(["status", "--project"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No workflow state"));
}
