use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_state_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("todoapp-{nanos}-{name}"))
}

fn write_tasks(state_dir: &Path, tasks: serde_json::Value) {
    std::fs::create_dir_all(state_dir).unwrap();
    std::fs::write(
        state_dir.join("tasks.json"),
        serde_json::to_string_pretty(&tasks).unwrap(),
    )
    .unwrap();
}

fn read_tasks(state_dir: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(state_dir.join("tasks.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn toggle_command_flips_completion_both_ways() {
    let exe = env!("CARGO_BIN_EXE_todo");
    let state_dir = temp_state_dir("cli-toggle");

    write_tasks(
        &state_dir,
        serde_json::json!([
            {
                "id": "task-1",
                "text": "water the plants",
                "completed": false,
                "createdAt": "2024-01-01T10:00:00Z",
                "updatedAt": "2024-01-01T10:00:00Z"
            }
        ]),
    );

    let output = Command::new(exe)
        .args(["toggle", "task-1"])
        .env("TODOAPP_STATE_DIR", &state_dir)
        .output()
        .expect("failed to run toggle command");
    assert!(output.status.success());
    assert_eq!(read_tasks(&state_dir)[0]["completed"], true);

    let output = Command::new(exe)
        .args(["toggle", "task-1"])
        .env("TODOAPP_STATE_DIR", &state_dir)
        .output()
        .expect("failed to run toggle command");
    assert!(output.status.success());

    let stored = read_tasks(&state_dir);
    std::fs::remove_dir_all(&state_dir).ok();

    assert_eq!(stored[0]["completed"], false);
    assert!(stored[0]["updatedAt"].as_str().unwrap() >= stored[0]["createdAt"].as_str().unwrap());
}

#[test]
fn toggle_command_ignores_unknown_id() {
    let exe = env!("CARGO_BIN_EXE_todo");
    let state_dir = temp_state_dir("cli-toggle-missing");

    write_tasks(
        &state_dir,
        serde_json::json!([
            {
                "id": "task-1",
                "text": "water the plants",
                "completed": false,
                "createdAt": "2024-01-01T10:00:00Z",
                "updatedAt": "2024-01-01T10:00:00Z"
            }
        ]),
    );

    let output = Command::new(exe)
        .args(["toggle", "task-2"])
        .env("TODOAPP_STATE_DIR", &state_dir)
        .output()
        .expect("failed to run toggle command");

    let stored = read_tasks(&state_dir);
    std::fs::remove_dir_all(&state_dir).ok();

    assert!(output.status.success(), "unknown id is a no-op, not an error");
    assert_eq!(stored[0]["completed"], false);
}

#[test]
fn delete_command_removes_task() {
    let exe = env!("CARGO_BIN_EXE_todo");
    let state_dir = temp_state_dir("cli-delete");

    write_tasks(
        &state_dir,
        serde_json::json!([
            {
                "id": "task-1",
                "text": "water the plants",
                "completed": false,
                "createdAt": "2024-01-01T10:00:00Z",
                "updatedAt": "2024-01-01T10:00:00Z"
            }
        ]),
    );

    let output = Command::new(exe)
        .args(["delete", "task-1"])
        .env("TODOAPP_STATE_DIR", &state_dir)
        .output()
        .expect("failed to run delete command");

    let stored = read_tasks(&state_dir);
    std::fs::remove_dir_all(&state_dir).ok();

    assert!(output.status.success());
    assert_eq!(stored.as_array().unwrap().len(), 0);
}

#[test]
fn edit_command_replaces_text() {
    let exe = env!("CARGO_BIN_EXE_todo");
    let state_dir = temp_state_dir("cli-edit");

    write_tasks(
        &state_dir,
        serde_json::json!([
            {
                "id": "task-1",
                "text": "old text",
                "completed": false,
                "createdAt": "2024-01-01T10:00:00Z",
                "updatedAt": "2024-01-01T10:00:00Z"
            }
        ]),
    );

    let output = Command::new(exe)
        .args(["edit", "task-1", "new text"])
        .env("TODOAPP_STATE_DIR", &state_dir)
        .output()
        .expect("failed to run edit command");

    let stored = read_tasks(&state_dir);
    std::fs::remove_dir_all(&state_dir).ok();

    assert!(output.status.success());
    assert_eq!(stored[0]["text"], "new text");
}
