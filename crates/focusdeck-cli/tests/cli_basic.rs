//! Basic CLI E2E tests.
//!
//! Every test gets its own data directory through FOCUSDECK_HOME.

use assert_cmd::cargo;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn focusdeck(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("focusdeck"));
    cmd.env("FOCUSDECK_HOME", home.path());
    cmd.env_remove("FOCUSDECK_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// Creates a task and returns its id from the "Task created: <id>" line.
fn add_task(home: &TempDir, args: &[&str]) -> String {
    let out = stdout_of(focusdeck(home).args(["task", "add"]).args(args));
    let first = out.lines().next().unwrap();
    first.strip_prefix("Task created: ").unwrap().trim().to_string()
}

#[test]
fn test_task_add_and_list() {
    let home = TempDir::new().unwrap();
    add_task(&home, &["Write report"]);

    let out = stdout_of(focusdeck(&home).args(["task", "list"]));
    let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Write report");
    assert_eq!(rows[0]["project"], "Quick Tasks");
}

#[test]
fn test_task_add_extracts_due_phrase() {
    let home = TempDir::new().unwrap();
    let id = add_task(&home, &["Call the bank by tomorrow"]);

    let out = stdout_of(focusdeck(&home).args(["task", "show", &id]));
    let task: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(task["title"], "Call the bank");
    assert!(task["dueDate"].is_string());
}

#[test]
fn test_task_done_hides_from_default_list() {
    let home = TempDir::new().unwrap();
    let id = add_task(&home, &["Water plants"]);

    focusdeck(&home)
        .args(["task", "done", &id[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task completed:"));

    let out = stdout_of(focusdeck(&home).args(["task", "list"]));
    assert_eq!(out.trim(), "[]");
    let out = stdout_of(focusdeck(&home).args(["task", "list", "--all"]));
    assert!(out.contains("Water plants"));
}

#[test]
fn test_unknown_task_prefix_fails() {
    let home = TempDir::new().unwrap();
    focusdeck(&home)
        .args(["task", "show", "ffffffff"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error:"));
}

#[test]
fn test_focus_start_status_stop() {
    let home = TempDir::new().unwrap();
    let id = add_task(&home, &["Deep work"]);

    focusdeck(&home)
        .args(["focus", "start", &id, "--interval", "5", "--url", "docs.rs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"FocusStarted\""))
        .stdout(predicate::str::contains("https://docs.rs"));

    let out = stdout_of(focusdeck(&home).args(["focus", "status"]));
    let snapshot: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert_eq!(snapshot["focusing"], true);
    assert_eq!(snapshot["title"], "Deep work");
    assert_eq!(snapshot["alert_interval_min"], 5);

    focusdeck(&home)
        .args(["focus", "stop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"FocusStopped\""));

    focusdeck(&home)
        .args(["focus", "stop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not focusing"));
}

#[test]
fn test_focus_rejects_interval_out_of_range() {
    let home = TempDir::new().unwrap();
    let id = add_task(&home, &["Deep work"]);

    focusdeck(&home)
        .args(["focus", "start", &id, "--interval", "20"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("between 1 and 15"));
}

#[test]
fn test_completing_focused_task_stops_focus() {
    let home = TempDir::new().unwrap();
    let id = add_task(&home, &["Deep work"]);
    stdout_of(focusdeck(&home).args(["focus", "start", &id]));

    focusdeck(&home)
        .args(["task", "done", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"FocusStopped\""));

    let out = stdout_of(focusdeck(&home).args(["focus", "status"]));
    let snapshot: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(snapshot["focusing"], false);
}

#[test]
fn test_zone_show_lists_explicit_zone() {
    let home = TempDir::new().unwrap();
    add_task(&home, &["Ship release", "--zone", "critical"]);

    let out = stdout_of(focusdeck(&home).args(["zone", "show"]));
    let lists: serde_json::Value = serde_json::from_str(&out).unwrap();
    let critical = lists["critical"].as_array().unwrap();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0]["title"], "Ship release");
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();

    focusdeck(&home)
        .args(["config", "get", "focus.default_interval_minutes"])
        .assert()
        .success()
        .stdout("10\n");

    focusdeck(&home)
        .args(["config", "set", "focus.default_interval_minutes", "3"])
        .assert()
        .success()
        .stdout("ok\n");

    focusdeck(&home)
        .args(["config", "get", "focus.default_interval_minutes"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_config_set_rejects_bad_values() {
    let home = TempDir::new().unwrap();

    focusdeck(&home)
        .args(["config", "set", "focus.default_interval_minutes", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));

    focusdeck(&home)
        .args(["config", "set", "display.nope", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_path_is_inside_home() {
    let home = TempDir::new().unwrap();
    let out = stdout_of(focusdeck(&home).args(["config", "path"]));
    assert!(out.trim().ends_with("config.toml"));
    assert!(out.contains(home.path().to_str().unwrap()));
}

#[test]
fn test_backup_list_after_changes() {
    let home = TempDir::new().unwrap();
    add_task(&home, &["First"]);
    add_task(&home, &["Second"]);

    let out = stdout_of(focusdeck(&home).args(["backup", "list"]));
    let snapshots: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(!snapshots.as_array().unwrap().is_empty());
}

#[test]
fn test_notes_roundtrip_through_cli() {
    let home = TempDir::new().unwrap();
    focusdeck(&home)
        .args(["note", "add", "Remember the milk", "--tags", "Errands, home"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Note created:"));

    let out = stdout_of(focusdeck(&home).args(["note", "tags"]));
    let tags: Vec<String> = serde_json::from_str(&out).unwrap();
    assert_eq!(tags, vec!["errands", "home"]);

    let out = stdout_of(focusdeck(&home).args(["note", "list", "--tag", "home"]));
    assert!(out.contains("Remember the milk"));
}

#[test]
fn test_digest_and_stats_on_empty_board() {
    let home = TempDir::new().unwrap();

    let out = stdout_of(focusdeck(&home).arg("stats"));
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["total"], 0);

    focusdeck(&home)
        .arg("digest")
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing on the board"));
}
