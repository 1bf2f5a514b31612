mod common;

use common::{Sandbox, stderr, stdout};

#[test]
fn tasks_json_lists_open_tasks_then_recent_completions() {
    let sandbox = Sandbox::new("tasks-json");
    let output = sandbox.run(&["tasks", "--json"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let ids: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();

    assert_eq!(
        ids,
        vec!["101", "102", "103", "109", "108", "107", "106", "105"]
    );
    assert_eq!(rows[0]["status"], "active");
    assert_eq!(rows[2]["robot"], "Unknown Robot");
    assert_eq!(rows[2]["status"], "error");
}

#[test]
fn tasks_table_shows_status_labels() {
    let sandbox = Sandbox::new("tasks-table");
    let output = sandbox.run(&["tasks"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("Move pallets"));
    assert!(stdout.contains("Active"));
    assert!(stdout.contains("Queued"));
    assert!(!stdout.contains("Calibrate lidar"));
    assert!(!stdout.contains("Sweep aisle 1"));
}

#[test]
fn robots_table_shows_battery_and_active_task() {
    let sandbox = Sandbox::new("robots");
    let output = sandbox.run(&["robots"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("86% (full)"));
    assert!(stdout.contains("48% (half)"));
    assert!(stdout.contains("12% (empty)"));
    assert!(stdout.contains("Move pallets"));
}

#[test]
fn task_and_robot_details() {
    let sandbox = Sandbox::new("details");

    let task = sandbox.run(&["task", "109", "--json"]);
    assert!(task.status.success());
    let task: serde_json::Value = serde_json::from_str(&stdout(&task)).unwrap();
    assert_eq!(task["robot"], "Comet");
    assert_eq!(task["completed"], "2024-11-27 09:15:00");

    let robot = sandbox.run(&["robot", "2"]);
    assert!(robot.status.success());
    let stdout = stdout(&robot);
    assert!(stdout.contains("Robot: Bolt (2)"));
    assert!(stdout.contains("Task: None"));

    let missing = sandbox.run(&["task", "999"]);
    assert!(!missing.status.success());
    assert_eq!(stderr(&missing).trim(), "ERROR: invalid_input - task not found");
}

#[test]
fn malformed_asset_degrades_to_empty_list_with_notice() {
    let sandbox = Sandbox::new("malformed");
    std::fs::write(sandbox.assets_dir().join("tasks.json"), "[{ broken").unwrap();

    let output = sandbox.run(&["tasks", "--json"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "[]");
    assert!(stderr(&output).contains("NOTICE: invalid JSON in"));
}

#[test]
fn remote_listing_requires_login() {
    let sandbox = Sandbox::new("remote-no-session");
    let output = sandbox.run(&["robots", "--remote"]);

    assert!(!output.status.success());
    assert_eq!(
        stderr(&output).trim(),
        "ERROR: auth_error - Please log in first."
    );
}
